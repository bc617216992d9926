//! Shared library for the ufcstats scraper.
//!
//! This crate provides the plumbing used by the scraper binary:
//! - Configuration management
//! - SQLite database setup and schema checks
//! - The link-state store (which entities were scraped, which failed)
//! - Output file layout
//! - Logging infrastructure

pub mod config;
pub mod db;
pub mod links;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use db::{Database, DbNotSetupError};
pub use links::{LinkStats, LinkStore, LinksDb};
pub use logging::LogConfig;
pub use models::*;
pub use paths::DataPaths;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
