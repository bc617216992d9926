//! JSON output of scraped records.

use crate::error::{ScrapeError, ScrapeResult};
use serde::Serialize;
use shared::{DataPaths, EntityType};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes records as pretty-printed JSON under the data directory
pub struct JsonWriter {
    paths: DataPaths,
}

impl JsonWriter {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Write a details record, keyed by the last segment of its link
    pub fn write_details<T: Serialize>(
        &self,
        entity: EntityType,
        link: &str,
        record: &T,
    ) -> ScrapeResult<PathBuf> {
        let path = self.paths.details_file(entity, &DataPaths::link_key(link));
        self.write(&path, record)?;
        Ok(path)
    }

    /// Write any serializable value, creating parent directories as needed
    pub fn write<T: Serialize>(&self, path: &Path, data: &T) -> ScrapeResult<()> {
        let io_error = |source: std::io::Error| ScrapeError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(data).map_err(|e| io_error(e.into()))?;
        std::fs::write(path, content).map_err(io_error)?;

        debug!(path = %path.display(), "Record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        event_name: String,
        round: u32,
    }

    #[test]
    fn test_write_details() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let writer = JsonWriter::new(DataPaths::new(temp_dir.path()));

        let sample = Sample {
            event_name: "UFC 300".to_string(),
            round: 3,
        };
        let path = writer.write_details(
            EntityType::Fight,
            "http://www.ufcstats.com/fight-details/8e83da4ad5e1ad3c",
            &sample,
        )?;

        assert_eq!(path, temp_dir.path().join("fight_details").join("8e83da4ad5e1ad3c.json"));
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(written["eventName"], "UFC 300");
        assert_eq!(written["round"], 3);

        Ok(())
    }

    #[test]
    fn test_write_failure_is_io_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        // A file where the output directory should be
        let blocker = temp_dir.path().join("event_details");
        std::fs::write(&blocker, "not a directory")?;

        let writer = JsonWriter::new(DataPaths::new(temp_dir.path()));
        let link = "http://www.ufcstats.com/event-details/e1";
        let result = writer.write_details(EntityType::Event, link, &1);
        assert!(matches!(result, Err(ScrapeError::Io { .. })));

        Ok(())
    }
}
