//! Event records: event details pages and events list rows.

use super::PerFighter;
use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{collapse_whitespace, FieldMap};
use crate::parse::{check_link, parse_location, parse_long_date, Location};
use chrono::NaiveDate;
use serde::Serialize;
use shared::{EntityType, NewLink};

/// Labels of the event information list
pub const EVENT_LABELS: &[&str] = &["date", "location"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterRef {
    pub link: String,
    pub name: String,
}

impl FighterRef {
    pub fn new(link: &str, name: &str) -> ScrapeResult<Self> {
        let name = collapse_whitespace(name);
        if name.is_empty() {
            return Err(ScrapeError::missing("fighter name"));
        }
        Ok(Self {
            link: check_link(EntityType::Fighter, link)?,
            name,
        })
    }
}

/// One bout listed on an event page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFight {
    pub link: String,
    #[serde(flatten)]
    pub fighters: PerFighter<FighterRef>,
}

impl EventFight {
    pub fn new(link: &str, fighters: PerFighter<FighterRef>) -> ScrapeResult<Self> {
        if fighters.fighter_1.link == fighters.fighter_2.link {
            return Err(ScrapeError::consistency(format!(
                "{} is listed on both sides of a fight",
                fighters.fighter_1.name
            )));
        }
        Ok(Self {
            link: check_link(EntityType::Fight, link)?,
            fighters,
        })
    }

    /// Display name, e.g. `Alex Pereira vs. Jamahal Hill`
    pub fn name(&self) -> String {
        format!("{} vs. {}", self.fighters.fighter_1.name, self.fighters.fighter_2.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub link: String,
    pub name: String,
    pub date: NaiveDate,
    pub location: Location,
    pub fights: Vec<EventFight>,
}

impl EventSummary {
    pub fn new(
        link: &str,
        name: &str,
        info: &FieldMap,
        fights: Vec<EventFight>,
    ) -> ScrapeResult<Self> {
        let name = collapse_whitespace(name);
        if name.is_empty() {
            return Err(ScrapeError::missing("event name"));
        }
        if fights.is_empty() {
            return Err(ScrapeError::missing("fight rows"));
        }
        info.require_all()?;

        Ok(Self {
            link: check_link(EntityType::Event, link)?,
            name,
            date: parse_long_date("date", info.require("date")?)?,
            location: parse_location(info.require("location")?)?,
            fights,
        })
    }

    /// Fighters appearing on the card, each once, in card order
    pub fn fighter_links(&self) -> Vec<NewLink> {
        let mut links: Vec<NewLink> = Vec::new();
        for fight in &self.fights {
            for fighter in fight.fighters.as_array() {
                if !links.iter().any(|l| l.link == fighter.link) {
                    links.push(NewLink::new(fighter.link.clone(), fighter.name.clone()));
                }
            }
        }
        links
    }

    /// Fights on the card, attached to the given event row and to both fighters
    pub fn fight_links(&self, event_id: i64) -> Vec<NewLink> {
        self.fights
            .iter()
            .map(|f| {
                NewLink::new(f.link.clone(), f.name())
                    .with_event(event_id)
                    .with_fighters(
                        f.fighters.fighter_1.link.clone(),
                        f.fighters.fighter_2.link.clone(),
                    )
            })
            .collect()
    }
}

/// One row of the completed events list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListing {
    pub link: String,
    pub name: String,
    pub date: NaiveDate,
    pub location: Location,
}

impl EventListing {
    pub fn new(link: &str, name: &str, date: &str, location: &str) -> ScrapeResult<Self> {
        let name = collapse_whitespace(name);
        if name.is_empty() {
            return Err(ScrapeError::missing("event name"));
        }
        Ok(Self {
            link: check_link(EntityType::Event, link)?,
            name,
            date: parse_long_date("date", &collapse_whitespace(date))?,
            location: parse_location(&collapse_whitespace(location))?,
        })
    }
}
