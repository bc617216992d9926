//! Configuration management for the ufcstats scraper.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. Every section and every field
//! may be omitted.

use crate::models::LinkSelection;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Scraper settings
    pub scraper: ScraperConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path (relative to data directory or absolute)
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root, without trailing slash
    pub base_url: String,

    /// Courtesy delay between requests, in seconds
    pub delay_secs: f64,

    /// Selection used when `--filter` is not given
    pub default_filter: LinkSelection,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "links.sqlite".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: false,
            file: true,
            json_format: false,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.ufcstats.com".to_string(),
            delay_secs: 1.0,
            default_filter: LinkSelection::Untried,
            timeout_secs: 30,
            user_agent: concat!("ufcstats-scraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScraperConfig {
    /// Courtesy delay
    pub fn delay(&self) -> Result<Duration> {
        resolve_delay(self.delay_secs).context("Invalid scraper.delay_secs")
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Convert a delay in seconds
///
/// The delay must be a positive number of seconds that fits a `Duration`.
pub fn resolve_delay(secs: f64) -> Result<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        bail!("delay must be a positive number of seconds, got {}", secs);
    }
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("delay of {} seconds is out of range", secs))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .scraper
            .delay()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the database file
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database.path)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
