//! List scrapes: the completed events list and the fighters list.
//!
//! These seed the store with event and fighter links. The events list is a
//! single page; the fighters list is one page per letter, each letter
//! scraped and saved on its own so one bad letter does not lose the others.

use crate::error::{ScrapeError, ScrapeResult};
use crate::fetch::Fetch;
use crate::pages::events_list::parse_events_list;
use crate::pages::fighters_list::parse_fighters_list;
use crate::records::{EventListing, FighterListing};
use crate::report::Reporter;
use crate::runner::BatchReport;
use crate::writer::JsonWriter;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use shared::{EntityType, LinksDb, NewLink};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Letters of the fighters list, in attempt order
pub fn all_letters() -> impl Iterator<Item = char> {
    'a'..='z'
}

pub fn events_list_url(base_url: &str) -> String {
    format!("{}/statistics/events/completed?page=all", base_url.trim_end_matches('/'))
}

pub fn fighters_list_url(base_url: &str, letter: char) -> String {
    format!("{}/statistics/fighters?char={}&page=all", base_url.trim_end_matches('/'), letter)
}

/// Drives the list scrapes
pub struct ListRunner<'a, F> {
    store: &'a mut LinksDb,
    fetcher: &'a mut F,
    writer: &'a JsonWriter,
    reporter: Reporter,
    /// Courtesy delay between letters
    delay: Duration,
}

impl<'a, F: Fetch> ListRunner<'a, F> {
    pub fn new(
        store: &'a mut LinksDb,
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

    /// Scrape the completed events list and save its links
    ///
    /// Events dated after `today` are not completed yet and are left out.
    pub async fn events_list(&mut self, base_url: &str, today: NaiveDate) -> Result<BatchReport> {
        let mut report = BatchReport::new("events list page", Some("Events found"));
        report.selected = 1;

        let url = events_list_url(base_url);
        info!(url = %url, "Scraping events list");
        self.reporter.line("Scraping events list...");

        match self.events_page(&url, today).await {
            Ok(events) => {
                let links: Vec<NewLink> = events
                    .iter()
                    .map(|e| NewLink::new(e.link.clone(), e.name.clone()))
                    .collect();
                let saved = self
                    .store
                    .insert_many(EntityType::Event, &links)
                    .context("Failed to save event links")?;
                info!(events = events.len(), saved = saved, "Events list scraped");

                report.succeeded = 1;
                report.children = events.len();
                self.reporter.success(&format!("{} events", events.len()));
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to scrape events list");
                report.failed = 1;
                self.reporter.failure(&e.to_string());
            }
        }

        Ok(report.finish())
    }

    async fn events_page(
        &mut self,
        url: &str,
        today: NaiveDate,
    ) -> ScrapeResult<Vec<EventListing>> {
        let html = self.fetcher.fetch(url).await?;
        let events = parse_events_list(&html, today);
        if events.is_empty() {
            return Err(ScrapeError::EmptyBatch(format!("no completed events on {}", url)));
        }
        self.writer.write(&self.writer.paths().events_list_file(), &events)?;
        Ok(events)
    }

    /// Scrape the fighters list letter by letter and save its links
    ///
    /// After the batch, every fighter scraped is also written to one combined
    /// file in attempt order.
    pub async fn fighters_list(
        &mut self,
        base_url: &str,
        letters: impl IntoIterator<Item = char>,
    ) -> Result<BatchReport> {
        let letters: Vec<char> = letters.into_iter().collect();
        let mut report = BatchReport::new("letter", Some("Fighters found"));
        report.selected = letters.len();

        let mut combined: Vec<FighterListing> = Vec::new();
        for (idx, letter) in letters.iter().enumerate() {
            let url = fighters_list_url(base_url, *letter);
            info!(
                progress = format!("{}/{}", idx + 1, letters.len()),
                letter = %letter,
                "Scraping fighters list"
            );

            match self.fighters_page(&url, *letter).await {
                Ok(fighters) => {
                    let links: Vec<NewLink> =
                        fighters.iter().map(FighterListing::to_new_link).collect();
                    self.store
                        .insert_many(EntityType::Fighter, &links)
                        .with_context(|| format!("Failed to save fighter links for {:?}", letter))?;

                    report.succeeded += 1;
                    report.children += fighters.len();
                    self.reporter.success(&format!(
                        "{}: {} fighters",
                        letter.to_ascii_uppercase(),
                        fighters.len()
                    ));
                    combined.extend(fighters);
                }
                Err(e) => {
                    warn!(
                        letter = %letter,
                        url = %url,
                        error = %e,
                        "Failed to scrape fighters list"
                    );
                    report.failed += 1;
                    self.reporter.failure(&format!("{}: {}", letter.to_ascii_uppercase(), e));
                }
            }

            if idx + 1 < letters.len() && !self.delay.is_zero() {
                debug!(delay_ms = self.delay.as_millis() as u64, "Waiting before next letter");
                sleep(self.delay).await;
            }
        }

        if !combined.is_empty() {
            let path = self.writer.paths().fighters_list_combined();
            self.writer
                .write(&path, &combined)
                .with_context(|| {
                    format!("Failed to write combined fighters list to {}", path.display())
                })?;
            info!(
                fighters = combined.len(),
                path = %path.display(),
                "Combined fighters list written"
            );
        }

        Ok(report.finish())
    }

    async fn fighters_page(
        &mut self,
        url: &str,
        letter: char,
    ) -> ScrapeResult<Vec<FighterListing>> {
        let html = self.fetcher.fetch(url).await?;
        let fighters = parse_fighters_list(&html);
        if fighters.is_empty() {
            return Err(ScrapeError::EmptyBatch(format!("no fighters on {}", url)));
        }
        self.writer.write(&self.writer.paths().fighters_list_file(letter), &fighters)?;
        Ok(fighters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::ScriptedFetcher;
    use crate::pages::events_list::tests::{event_row, events_page};
    use crate::pages::fighters_list::tests::{fighter_row, fighters_page};
    use crate::runner::BatchOutcome;
    use shared::{Database, DataPaths};
    use tempfile::TempDir;

    const BASE_URL: &str = "http://www.ufcstats.com";
    const VEGAS: &str = "Las Vegas, Nevada, USA";

    fn store() -> Result<LinksDb> {
        let mut db = Database::open_in_memory()?;
        db.setup()?;
        Ok(LinksDb::new(db))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 20).unwrap()
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            events_list_url("http://www.ufcstats.com/"),
            "http://www.ufcstats.com/statistics/events/completed?page=all"
        );
        assert_eq!(
            fighters_list_url(BASE_URL, 'q'),
            "http://www.ufcstats.com/statistics/fighters?char=q&page=all"
        );
        assert_eq!(all_letters().count(), 26);
    }

    #[tokio::test]
    async fn test_events_list() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = DataPaths::new(temp_dir.path());
        let writer = JsonWriter::new(paths.clone());
        let mut store = store()?;

        let html = events_page(&[
            event_row("e3", "UFC 301: Pantoja vs. Erceg", "May 04, 2024", "Rio de Janeiro, Brazil"),
            event_row("e2", "UFC 300: Pereira vs. Hill", "April 13, 2024", VEGAS),
            event_row("e1", "UFC Fight Night: Allen vs. Curtis 2", "April 06, 2024", VEGAS),
        ]);
        let mut fetcher = ScriptedFetcher::new(vec![Ok(html)]);

        let report =
            ListRunner::new(&mut store, &mut fetcher, &writer, Reporter::new(true), Duration::ZERO)
                .events_list(BASE_URL, today())
                .await?;

        assert_eq!(report.outcome, BatchOutcome::Success);
        assert_eq!(report.children, 2);
        assert_eq!(store.stats(EntityType::Event)?.untried, 2);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.events_list_file())?)?;
        assert_eq!(written[0]["name"], "UFC 300: Pereira vs. Hill");
        assert_eq!(written[1]["date"], "2024-04-06");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_events_list_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let writer = JsonWriter::new(DataPaths::new(temp_dir.path()));
        let mut store = store()?;
        let mut fetcher = ScriptedFetcher::new(vec![Ok(events_page(&[]))]);

        let report =
            ListRunner::new(&mut store, &mut fetcher, &writer, Reporter::new(true), Duration::ZERO)
                .events_list(BASE_URL, today())
                .await?;

        assert_eq!(report.outcome, BatchOutcome::TotalFailure);
        assert_eq!(report.outcome.exit_code(), 2);
        assert!(store.is_table_empty(EntityType::Event)?);

        Ok(())
    }

    #[tokio::test]
    async fn test_fighters_list() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = DataPaths::new(temp_dir.path());
        let writer = JsonWriter::new(paths.clone());
        let mut store = store()?;

        let mut fetcher = ScriptedFetcher::new(vec![
            Ok(fighters_page(&[fighter_row("a1", "Tom", "Aaron", false)])),
            Err(ScriptedFetcher::transport_error("b")),
            Ok(fighters_page(&[
                fighter_row("c1", "Alex", "Caceres", false),
                fighter_row("c2", "Henry", "Cejudo", true),
            ])),
        ]);

        let report =
            ListRunner::new(&mut store, &mut fetcher, &writer, Reporter::new(true), Duration::ZERO)
                .fighters_list(BASE_URL, ['a', 'b', 'c'])
                .await?;

        assert_eq!(report.outcome, BatchOutcome::PartialSuccess);
        assert_eq!((report.succeeded, report.failed, report.children), (2, 1, 3));
        assert_eq!(store.stats(EntityType::Fighter)?.total, 3);
        assert_eq!(fetcher.requested[1], fighters_list_url(BASE_URL, 'b'));

        assert!(paths.fighters_list_file('a').exists());
        assert!(!paths.fighters_list_file('b').exists());

        let combined: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.fighters_list_combined())?)?;
        let names: Vec<&str> = combined
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["lastName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Aaron", "Caceres", "Cejudo"]);
        assert_eq!(combined[2]["currentChampion"], true);

        Ok(())
    }

    #[tokio::test]
    async fn test_fighters_list_all_fail() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = DataPaths::new(temp_dir.path());
        let writer = JsonWriter::new(paths.clone());
        let mut store = store()?;
        let mut fetcher = ScriptedFetcher::new(vec![Ok(fighters_page(&[]))]);

        let report =
            ListRunner::new(&mut store, &mut fetcher, &writer, Reporter::new(true), Duration::ZERO)
                .fighters_list(BASE_URL, ['x', 'y'])
                .await?;

        assert_eq!(report.outcome, BatchOutcome::TotalFailure);
        assert!(!paths.fighters_list_combined().exists());

        Ok(())
    }
}
