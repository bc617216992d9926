//! ufcstats scraper library.
//!
//! Scrapes fighters, events and fights from www.ufcstats.com, validates every
//! record against the numeric and cross-field rules of the site's data, and
//! tracks per-entity scrape status in the link store so later runs can
//! resume untried links or retry failed ones.

pub mod error;
pub mod fetch;
pub mod html;
pub mod lists;
pub mod pages;
pub mod parse;
pub mod records;
pub mod report;
pub mod runner;
pub mod stats;
pub mod writer;

pub use error::{ScrapeError, ScrapeResult};
pub use fetch::{Fetch, HttpFetcher};
pub use lists::ListRunner;
pub use pages::{DetailsPage, EventDetailsPage, FightDetailsPage, FighterDetailsPage};
pub use report::Reporter;
pub use runner::{AttemptError, AttemptPhase, BatchOutcome, BatchReport, BatchRunner};
pub use stats::{Count, Ratio};
pub use writer::JsonWriter;
