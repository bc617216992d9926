//! User-facing progress lines.
//!
//! Logs go through `tracing`; the lines a person watching the terminal reads
//! go through a [`Reporter`], created once in `main` and passed down.

use crate::runner::{BatchOutcome, BatchReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Section heading, e.g. `SCRAPING EVENT DETAILS`
    pub fn title(&self, text: &str) {
        if !self.quiet {
            println!();
            println!("{}", text.to_uppercase());
            println!("{}", "=".repeat(text.len()));
        }
    }

    pub fn line(&self, text: &str) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    pub fn success(&self, text: &str) {
        self.line(&format!("[ok] {}", text));
    }

    pub fn failure(&self, text: &str) {
        self.line(&format!("[failed] {}", text));
    }

    /// Final summary of a batch
    pub fn summary(&self, report: &BatchReport) {
        if self.quiet {
            return;
        }
        println!();
        match report.outcome {
            BatchOutcome::NothingToDo => {
                println!("Nothing to do: no {} links selected.", report.entity);
                return;
            }
            BatchOutcome::Success => {
                println!("All {} {}s scraped.", report.succeeded, report.entity)
            }
            BatchOutcome::PartialSuccess => {
                println!("Some {}s could not be scraped.", report.entity)
            }
            BatchOutcome::TotalFailure => println!("No {} was scraped.", report.entity),
        }
        println!("Selected:  {}", report.selected);
        println!("Succeeded: {}", report.succeeded);
        println!("Failed:    {}", report.failed);
        if let Some(label) = &report.children_label {
            println!("{}: {}", label, report.children);
        }
    }
}
