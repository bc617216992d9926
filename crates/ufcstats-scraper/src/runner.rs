//! Batch orchestrator for details pages.
//!
//! Selects a batch of links from the store and scrapes them one at a time:
//! fetch, parse and validate, save, then record the outcome. A failing entity
//! is recorded as failed and the batch moves on; only store errors end the
//! run, since the store is the source of truth for what was scraped.

use crate::error::ScrapeError;
use crate::fetch::Fetch;
use crate::pages::DetailsPage;
use crate::report::Reporter;
use crate::writer::JsonWriter;
use anyhow::{Context, Result};
use shared::{LinkRecord, LinkSelection, LinkStore};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Classification of a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The selection was empty
    NothingToDo,
    Success,
    PartialSuccess,
    TotalFailure,
}

impl BatchOutcome {
    pub fn classify(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (0, 0) => BatchOutcome::NothingToDo,
            (0, _) => BatchOutcome::TotalFailure,
            (_, 0) => BatchOutcome::Success,
            _ => BatchOutcome::PartialSuccess,
        }
    }

    /// Process exit code: 0 nothing failed, 1 some failed, 2 all failed
    pub fn exit_code(&self) -> u8 {
        match self {
            BatchOutcome::NothingToDo | BatchOutcome::Success => 0,
            BatchOutcome::PartialSuccess => 1,
            BatchOutcome::TotalFailure => 2,
        }
    }
}

/// Counts reported at the end of a batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// What was scraped, e.g. `event` or `letter`
    pub entity: String,
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Child items found in the scraped entities (fights of events)
    pub children: usize,
    pub children_label: Option<&'static str>,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    pub fn new(entity: impl Into<String>, children_label: Option<&'static str>) -> Self {
        Self {
            entity: entity.into(),
            selected: 0,
            succeeded: 0,
            failed: 0,
            children: 0,
            children_label,
            outcome: BatchOutcome::NothingToDo,
        }
    }

    /// Set the outcome from the counts
    pub fn finish(mut self) -> Self {
        self.outcome = BatchOutcome::classify(self.succeeded, self.failed);
        self
    }
}

/// Step of a single entity attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Fetching,
    Parsing,
    Saving,
}

impl fmt::Display for AttemptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptPhase::Fetching => write!(f, "fetching"),
            AttemptPhase::Parsing => write!(f, "parsing"),
            AttemptPhase::Saving => write!(f, "saving"),
        }
    }
}

/// An entity failure and the phase it happened in
#[derive(Debug, thiserror::Error)]
#[error("{phase} failed: {source}")]
pub struct AttemptError {
    pub phase: AttemptPhase,
    #[source]
    pub source: ScrapeError,
}

impl AttemptError {
    fn at(phase: AttemptPhase) -> impl FnOnce(ScrapeError) -> AttemptError {
        move |source| AttemptError { phase, source }
    }
}

/// Drives one batch of details pages
pub struct BatchRunner<'a, S, F> {
    store: &'a mut S,
    fetcher: &'a mut F,
    writer: &'a JsonWriter,
    reporter: Reporter,
    /// Courtesy delay between entities
    delay: Duration,
}

impl<'a, S: LinkStore, F: Fetch> BatchRunner<'a, S, F> {
    pub fn new(
        store: &'a mut S,
        fetcher: &'a mut F,
        writer: &'a JsonWriter,
        reporter: Reporter,
        delay: Duration,
    ) -> Self {
        Self {
            store,
            fetcher,
            writer,
            reporter,
            delay,
        }
    }

    /// Scrape every selected link of the page's entity type
    pub async fn run<P: DetailsPage>(
        &mut self,
        selection: LinkSelection,
        limit: Option<usize>,
    ) -> Result<BatchReport> {
        let entity = P::ENTITY;
        let mut report = BatchReport::new(entity.to_string(), P::CHILD_LABEL);

        info!(entity = %entity, selection = %selection, limit = ?limit, "Selecting batch");
        let batch = self
            .store
            .select_batch(entity, selection, limit)
            .with_context(|| format!("Failed to read {} links", entity))?;
        report.selected = batch.len();

        if batch.is_empty() {
            info!(entity = %entity, selection = %selection, "Nothing to do");
            return Ok(report);
        }
        self.reporter.line(&format!("Selected {} {} links ({}).", batch.len(), entity, selection));

        for (idx, link) in batch.iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, batch.len()),
                entity = %entity,
                name = %link.name,
                "Scraping"
            );

            match self.attempt::<P>(link).await {
                Ok(record) => {
                    self.store
                        .record_attempt(entity, link.id, true, true)
                        .with_context(|| {
                            format!("Failed to update status of {} {}", entity, link.id)
                        })?;

                    let discovered = P::discovered_links(&record, link.id);
                    for (child, new_link) in &discovered {
                        self.store
                            .insert_new(*child, new_link)
                            .with_context(|| {
                                format!("Failed to save {} link {}", child, new_link.link)
                            })?;
                    }
                    if !discovered.is_empty() {
                        debug!(
                            entity = %entity,
                            id = link.id,
                            links = discovered.len(),
                            "Saved discovered links"
                        );
                    }

                    report.succeeded += 1;
                    report.children += P::child_count(&record);
                    self.reporter.success(&link.name);
                }
                Err(e) => {
                    warn!(
                        entity = %entity,
                        link = %link.link,
                        phase = %e.phase,
                        kind = e.source.kind(),
                        error = %e.source,
                        "Failed to scrape entity"
                    );
                    self.store
                        .record_attempt(entity, link.id, true, false)
                        .with_context(|| {
                            format!("Failed to update status of {} {}", entity, link.id)
                        })?;

                    report.failed += 1;
                    self.reporter.failure(&format!("{}: {}", link.name, e));
                }
            }

            if idx + 1 < batch.len() && !self.delay.is_zero() {
                debug!(delay_ms = self.delay.as_millis() as u64, "Waiting before next entity");
                sleep(self.delay).await;
            }
        }

        let report = report.finish();
        info!(
            entity = %entity,
            selected = report.selected,
            succeeded = report.succeeded,
            failed = report.failed,
            children = report.children,
            outcome = ?report.outcome,
            "Batch complete"
        );
        Ok(report)
    }

    /// Fetch, parse and save one entity
    async fn attempt<P: DetailsPage>(
        &mut self,
        link: &LinkRecord,
    ) -> Result<P::Record, AttemptError> {
        let html = self
            .fetcher
            .fetch(&link.link)
            .await
            .map_err(AttemptError::at(AttemptPhase::Fetching))?;

        let record = P::parse(&link.link, &html).map_err(AttemptError::at(AttemptPhase::Parsing))?;

        let path = self
            .writer
            .write_details(P::ENTITY, &link.link, &record)
            .map_err(AttemptError::at(AttemptPhase::Saving))?;
        debug!(path = %path.display(), "Saved record");

        Ok(record)
    }
}
