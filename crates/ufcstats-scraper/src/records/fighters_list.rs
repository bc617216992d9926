//! Fighters list rows.

use crate::error::{ScrapeError, ScrapeResult};
use crate::html::collapse_whitespace;
use crate::parse::{
    check_link, optional, parse_height, parse_reach, parse_stance, parse_uint, parse_weight, Stance,
};
use serde::Serialize;
use shared::{EntityType, NewLink};

/// Columns of a fighters list row, belt column included
pub const LIST_COLUMNS: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterListing {
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance: Option<Stance>,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub current_champion: bool,
}

/// Text cell with the `--` marker mapped to `None`
fn text_cell(text: &str) -> Option<String> {
    let text = collapse_whitespace(text.trim().trim_matches('-'));
    (!text.is_empty()).then_some(text)
}

impl FighterListing {
    /// Build from the ten text cells of a row and the belt marker
    pub fn from_cells(link: &str, cells: &[String], current_champion: bool) -> ScrapeResult<Self> {
        let [first, last, nickname, height, weight, reach, stance, wins, losses, draws] = cells
        else {
            return Err(ScrapeError::missing(format!(
                "fighters list cells (expected 10, found {})",
                cells.len()
            )));
        };

        let listing = Self {
            link: check_link(EntityType::Fighter, link)?,
            first_name: text_cell(first),
            last_name: text_cell(last),
            nickname: text_cell(nickname),
            height: optional(height.trim(), parse_height)?,
            weight: optional(weight.trim(), parse_weight)?,
            reach: optional(reach.trim(), parse_reach)?,
            stance: optional(stance.trim(), parse_stance)?,
            wins: parse_uint("wins", wins.trim())?,
            losses: parse_uint("losses", losses.trim())?,
            draws: parse_uint("draws", draws.trim())?,
            current_champion,
        };

        if listing.full_name().is_empty() {
            return Err(ScrapeError::consistency("fighter has no name"));
        }
        Ok(listing)
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        format!("{} {}", first, last).trim().to_string()
    }

    pub fn to_new_link(&self) -> NewLink {
        NewLink::new(self.link.clone(), self.full_name())
    }
}
