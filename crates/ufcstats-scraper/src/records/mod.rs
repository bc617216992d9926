//! Validated records.
//!
//! Page parsers collect raw fragments; the constructors in this module turn
//! them into immutable typed records in one validating step. A record that
//! exists has passed every field and cross-field check.

pub mod event;
pub mod fight;
pub mod fighter;
pub mod fighters_list;

pub use event::{EventFight, EventListing, EventSummary, FighterRef};
pub use fight::{
    Bonus, BoutDecision, BoutInfo, FightRecord, FightResult, FighterTotals, RawFight,
    RawRoundTables, RoundBreakdown, RoundStats, Sex, SignificantStrikeBreakdown, WeightClass,
};
pub use fighter::{CareerStats, FighterProfile, PersonalInfo};
pub use fighters_list::FighterListing;

use serde::Serialize;

/// One value per corner, in page order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerFighter<T> {
    pub fighter_1: T,
    pub fighter_2: T,
}

impl<T> PerFighter<T> {
    pub fn new(fighter_1: T, fighter_2: T) -> Self {
        Self { fighter_1, fighter_2 }
    }

    pub fn as_array(&self) -> [&T; 2] {
        [&self.fighter_1, &self.fighter_2]
    }
}
