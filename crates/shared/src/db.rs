//! Database operations for SQLite.
//!
//! This module handles the connection, schema creation, reset and the
//! "is the links database set up" check used before every scrape.

use crate::models::EntityType;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 2;

/// Returned when a scrape is attempted before `db-setup`
#[derive(Debug, thiserror::Error)]
#[error("links database is not set up; run the db-setup command first")]
pub struct DbNotSetupError;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        debug!(path = %path.display(), "Opening database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Enable foreign keys
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;

        Ok(Self { conn })
    }

    /// Create every table (idempotent)
    pub fn setup(&mut self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("../schema.sql"))
            .context("Failed to create database schema")?;
        self.set_version(SCHEMA_VERSION)?;

        info!(version = SCHEMA_VERSION, "Database schema created successfully");
        Ok(())
    }

    /// Drop every table, children first
    pub fn reset(&mut self) -> Result<()> {
        for entity in EntityType::ALL.iter().rev() {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {}", entity.table()))
                .with_context(|| format!("Failed to drop table {}", entity.table()))?;
            info!(table = entity.table(), "Dropped table");
        }
        self.set_version(0)?;
        Ok(())
    }

    /// Check that every table exists with exactly the expected columns
    pub fn is_setup(&self) -> Result<bool> {
        for entity in EntityType::ALL {
            let table = entity.table();
            if !self.table_exists(table)? {
                info!(table, "Table is missing");
                return Ok(false);
            }

            let mut columns = self.table_columns(table)?;
            columns.sort_unstable();
            let mut expected: Vec<&str> = expected_columns(entity).to_vec();
            expected.sort_unstable();
            if columns != expected {
                info!(table, ?columns, "Table does not have the expected columns");
                return Ok(false);
            }
        }

        let version = self.get_version()?;
        if version != SCHEMA_VERSION {
            info!(version, expected = SCHEMA_VERSION, "Schema version does not match");
            return Ok(false);
        }
        Ok(true)
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get a mutable reference to the underlying connection
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of a table, in declaration order
    pub fn table_columns(&self, table_name: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([table_name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Get the database version (from user_version pragma)
    pub fn get_version(&self) -> Result<i32> {
        let version: i32 = self.conn.query_row(
            "PRAGMA user_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    /// Set the database version
    pub fn set_version(&self, version: i32) -> Result<()> {
        self.conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        Ok(())
    }
}

/// Columns created by `schema.sql` for each table
fn expected_columns(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Event | EntityType::Fighter => &[
            "id",
            "link",
            "name",
            "tried",
            "success",
            "created_at",
            "updated_at",
        ],
        EntityType::Fight => &[
            "id",
            "link",
            "name",
            "event_id",
            "fighter_1_id",
            "fighter_2_id",
            "tried",
            "success",
            "created_at",
            "updated_at",
        ],
    }
}
