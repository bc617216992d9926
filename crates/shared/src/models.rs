//! Data models for the link-state store.
//!
//! Every trackable entity (event, fighter, fight) is one row identified by
//! its ufcstats link, plus the status of the last scrape attempt.

use serde::{Deserialize, Serialize};

/// Kind of entity tracked by the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Event,
    Fighter,
    Fight,
}

impl EntityType {
    /// All entity types, in the order their tables are created
    pub const ALL: [EntityType; 3] = [EntityType::Event, EntityType::Fighter, EntityType::Fight];

    /// Table holding the links for this entity type
    pub fn table(&self) -> &'static str {
        match self {
            EntityType::Event => "event",
            EntityType::Fighter => "fighter",
            EntityType::Fight => "fight",
        }
    }

    /// Path prefix of a details page, e.g. `/fight-details/`
    pub fn details_path(&self) -> String {
        format!("/{}-details/", self.table())
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

impl std::str::FromStr for EntityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(EntityType::Event),
            "fighter" => Ok(EntityType::Fighter),
            "fight" => Ok(EntityType::Fight),
            _ => Err(anyhow::anyhow!("Invalid entity type: {}", s)),
        }
    }
}

/// Filter applied when selecting a batch of links
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkSelection {
    /// Every row, in insertion order
    All,
    /// Rows that were tried and failed
    Failed,
    /// Rows never tried
    #[default]
    Untried,
}

impl std::fmt::Display for LinkSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkSelection::All => write!(f, "all"),
            LinkSelection::Failed => write!(f, "failed"),
            LinkSelection::Untried => write!(f, "untried"),
        }
    }
}

impl std::str::FromStr for LinkSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(LinkSelection::All),
            "failed" => Ok(LinkSelection::Failed),
            "untried" => Ok(LinkSelection::Untried),
            _ => Err(anyhow::anyhow!(
                "Invalid link selection: {} (expected all, failed or untried)",
                s
            )),
        }
    }
}

/// Status derived from the `tried`/`success` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Untried,
    Succeeded,
    Failed,
}

/// One row of the link-state store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: i64,
    pub link: String,
    /// Human readable name (event name, fighter name, "A vs. B")
    pub name: String,
    pub tried: bool,
    /// `None` until the entity has been tried
    pub success: Option<bool>,
}

impl LinkRecord {
    pub fn status(&self) -> ScrapeStatus {
        match (self.tried, self.success) {
            (false, _) => ScrapeStatus::Untried,
            (true, Some(true)) => ScrapeStatus::Succeeded,
            (true, _) => ScrapeStatus::Failed,
        }
    }
}

/// A newly discovered link to be upserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLink {
    pub link: String,
    pub name: String,
    /// Parent event row; only stored for fights
    pub event_id: Option<i64>,
    /// Links of both corners; only stored for fights, as fighter row IDs
    pub fighters: Option<[String; 2]>,
}

impl NewLink {
    pub fn new(link: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            name: name.into(),
            event_id: None,
            fighters: None,
        }
    }

    pub fn with_event(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn with_fighters(
        mut self,
        fighter_1: impl Into<String>,
        fighter_2: impl Into<String>,
    ) -> Self {
        self.fighters = Some([fighter_1.into(), fighter_2.into()]);
        self
    }
}
