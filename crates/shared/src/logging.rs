//! Logging infrastructure for the ufcstats scraper.
//!
//! This module provides structured logging with file rotation, contextual fields,
//! and module-specific log levels. User-facing progress lines are not logs;
//! they go through the scraper's reporter.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "ufcstats_scraper".to_string(),
            default_level: Level::INFO,
            console: false,
            file: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section
    ///
    /// An unknown level name falls back to INFO.
    pub fn from_settings(settings: &crate::config::LoggingConfig, log_dir: &Path) -> Self {
        let default_level = settings.default_level.parse().unwrap_or_else(|_| {
            eprintln!(
                "Invalid log level {:?}, using info",
                settings.default_level
            );
            Level::INFO
        });

        Self {
            log_dir: log_dir.to_string_lossy().to_string(),
            default_level,
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
            ..Default::default()
        }
    }

    /// Filter directives used when `RUST_LOG` is not set
    pub fn filter_directives(&self) -> String {
        format!(
            "{}={},shared={},ufcstats_scraper={},\
             html5ever=warn,selectors=warn,hyper=warn,reqwest=warn",
            self.component,
            self.default_level,
            self.default_level,
            self.default_level
        )
    }
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Daily file rotation
/// - Structured logging with contextual fields
/// - Module-specific log levels
/// - Optional JSON formatting
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    if config.file {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;
    }

    // Default to configured level, but allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let mut layers = Vec::new();

    // Console layer (human-readable, stderr so it never mixes with the reporter)
    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    // File layer with rotation
    if config.file {
        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}
