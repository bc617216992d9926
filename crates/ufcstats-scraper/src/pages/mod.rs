//! Page parsers.
//!
//! Each parser walks the document tree of one kind of ufcstats page, collects
//! the raw fragments and hands them to the validating constructors in
//! [`crate::records`]. Details pages implement [`DetailsPage`] so the batch
//! runner can drive all three entity kinds the same way.

pub mod event_details;
pub mod events_list;
pub mod fight_details;
pub mod fighter_details;
pub mod fighters_list;

pub use event_details::EventDetailsPage;
pub use fight_details::FightDetailsPage;
pub use fighter_details::FighterDetailsPage;

use crate::error::ScrapeResult;
use serde::Serialize;
use shared::{EntityType, NewLink};

/// A details page kind the batch runner can scrape
pub trait DetailsPage {
    type Record: Serialize;

    /// Store table the page's links live in
    const ENTITY: EntityType;

    /// Parse and validate one fetched page
    fn parse(link: &str, html: &str) -> ScrapeResult<Self::Record>;

    /// Links found on a scraped page, to be added to the store
    ///
    /// `id` is the store row of the scraped entity.
    fn discovered_links(_record: &Self::Record, _id: i64) -> Vec<(EntityType, NewLink)> {
        Vec::new()
    }

    /// Summary label for the child items, when the page has any
    const CHILD_LABEL: Option<&'static str> = None;

    /// Number of child items in the record, reported in the batch summary
    fn child_count(_record: &Self::Record) -> usize {
        0
    }
}
