//! Scrape error taxonomy.
//!
//! Every variant is fatal to the entity being scraped and never to the
//! batch, except `EmptyBatch` which ends the run.

use std::path::PathBuf;

/// Errors raised while fetching, parsing, validating or saving one entity
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A field does not match its micro-grammar
    #[error("Failed to parse {field}: expected {expected}, got {value:?}")]
    Parse {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    /// An expected element is absent or has the wrong cardinality
    #[error("Failed to find necessary HTML element(s): {0}")]
    MissingStructure(String),

    /// A cross-field invariant does not hold
    #[error("Inconsistent data: {0}")]
    Consistency(String),

    /// The fetch failed or returned a non-success status
    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Every entity failed, or a list page had no rows
    #[error("No data was scraped: {0}")]
    EmptyBatch(String),

    /// The record could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for scraping one entity
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    pub fn parse(field: &'static str, expected: &'static str, value: impl Into<String>) -> Self {
        ScrapeError::Parse {
            field,
            expected,
            value: value.into(),
        }
    }

    pub fn missing(what: impl Into<String>) -> Self {
        ScrapeError::MissingStructure(what.into())
    }

    pub fn consistency(what: impl Into<String>) -> Self {
        ScrapeError::Consistency(what.into())
    }

    /// Short name of the error kind, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Parse { .. } => "parse",
            ScrapeError::MissingStructure(_) => "missing_structure",
            ScrapeError::Consistency(_) => "consistency",
            ScrapeError::Transport { .. } => "transport",
            ScrapeError::EmptyBatch(_) => "empty_batch",
            ScrapeError::Io { .. } => "io",
        }
    }
}
