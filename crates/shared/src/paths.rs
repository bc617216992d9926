//! File path utilities for organizing scraped JSON files.
//!
//! This module provides a centralized way to manage the output layout
//! (events list, fighters list, per-entity details) under the data directory.

use crate::models::EntityType;
use std::path::{Path, PathBuf};

/// File path manager for data files
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    // ========== Lists ==========

    /// Get the events list file
    pub fn events_list_file(&self) -> PathBuf {
        self.root.join("events_list").join("events_list.json")
    }

    /// Get the fighters list directory
    pub fn fighters_list_dir(&self) -> PathBuf {
        self.root.join("fighters_list")
    }

    /// Get the fighters list file for one letter
    pub fn fighters_list_file(&self, letter: char) -> PathBuf {
        self.fighters_list_dir()
            .join(format!("{}.json", letter.to_ascii_lowercase()))
    }

    /// Get the combined fighters list file (every letter, attempt order)
    pub fn fighters_list_combined(&self) -> PathBuf {
        self.fighters_list_dir().join("combined.json")
    }

    // ========== Details ==========

    /// Get the details directory for an entity type
    pub fn details_dir(&self, entity: EntityType) -> PathBuf {
        self.root.join(format!("{}_details", entity.table()))
    }

    /// Get the details file for one entity
    pub fn details_file(&self, entity: EntityType, key: &str) -> PathBuf {
        self.details_dir(entity).join(format!("{}.json", key))
    }

    // ========== Logs ==========

    /// Get logs directory
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    // ========== Utility Methods ==========

    /// Create all necessary directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        let mut dirs = vec![
            self.root.join("events_list"),
            self.fighters_list_dir(),
            self.logs_dir(),
        ];
        dirs.extend(EntityType::ALL.iter().map(|e| self.details_dir(*e)));

        for dir in dirs {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(())
    }

    /// File key for a link: its last path segment, restricted to safe characters
    pub fn link_key(link: &str) -> String {
        let segment = link
            .split(['?', '#'])
            .next()
            .unwrap_or(link)
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        segment
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let paths = DataPaths::new("/data");

        assert_eq!(
            paths.events_list_file(),
            PathBuf::from("/data/events_list/events_list.json")
        );

        assert_eq!(
            paths.fighters_list_file('B'),
            PathBuf::from("/data/fighters_list/b.json")
        );

        assert_eq!(
            paths.details_file(EntityType::Fight, "f6b7d3a1c2e4"),
            PathBuf::from("/data/fight_details/f6b7d3a1c2e4.json")
        );
    }

    #[test]
    fn test_link_key() {
        assert_eq!(
            DataPaths::link_key("http://www.ufcstats.com/event-details/6420efac0578988b"),
            "6420efac0578988b"
        );
        assert_eq!(
            DataPaths::link_key("http://www.ufcstats.com/fighter-details/93fe7332d16c6ad9/"),
            "93fe7332d16c6ad9"
        );
        assert_eq!(DataPaths::link_key("http://host/a/../b?x=1"), "b");
    }

    #[test]
    fn test_create_dirs() -> std::io::Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let paths = DataPaths::new(temp_dir.path());
        paths.create_dirs()?;

        assert!(paths.details_dir(EntityType::Event).is_dir());
        assert!(paths.fighters_list_dir().is_dir());
        Ok(())
    }
}
