//! Link-state store.
//!
//! Tracks every discovered entity by link together with the status of the
//! last scrape attempt, and answers the batch-selection queries that drive
//! the orchestrator.

use crate::models::*;
use crate::Database;
use anyhow::{bail, Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

/// Read/write contract over persisted per-entity scrape status
pub trait LinkStore {
    /// Select the rows matching `selection`, in insertion order
    fn select_batch(
        &self,
        entity: EntityType,
        selection: LinkSelection,
        limit: Option<usize>,
    ) -> Result<Vec<LinkRecord>>;

    /// Overwrite the status of one row
    ///
    /// Calling this twice with the same arguments leaves the row unchanged.
    fn record_attempt(
        &mut self,
        entity: EntityType,
        id: i64,
        tried: bool,
        success: bool,
    ) -> Result<()>;

    /// Insert a link, or update the name of the existing row with that link
    ///
    /// Returns the row ID. Scrape status is never reset.
    fn insert_new(&mut self, entity: EntityType, link: &NewLink) -> Result<i64>;
}

/// SQLite-backed link store
pub struct LinksDb {
    db: Database,
}

impl LinksDb {
    /// Create a new link store with the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Check whether a table has no rows
    pub fn is_table_empty(&self, entity: EntityType) -> Result<bool> {
        Ok(self.stats(entity)?.total == 0)
    }

    /// Insert many links in one transaction
    pub fn insert_many(&mut self, entity: EntityType, links: &[NewLink]) -> Result<usize> {
        let tx = self
            .db
            .conn_mut()
            .transaction()
            .context("Failed to begin transaction")?;

        for link in links {
            upsert(&tx, entity, link)?;
        }

        tx.commit().context("Failed to commit links")?;
        info!(entity = %entity, count = links.len(), "Saved links");
        Ok(links.len())
    }

    /// Get link statistics for one entity type
    pub fn stats(&self, entity: EntityType) -> Result<LinkStats> {
        let conn = self.db.conn();

        let (total, untried, succeeded, failed): (i64, i64, i64, i64) = conn.query_row(
            &format!(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN tried = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN tried = 1 AND success = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN tried = 1 AND success = 0 THEN 1 ELSE 0 END), 0)
                 FROM {}",
                entity.table()
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(LinkStats {
            total: total as usize,
            untried: untried as usize,
            succeeded: succeeded as usize,
            failed: failed as usize,
        })
    }
}

impl LinkStore for LinksDb {
    fn select_batch(
        &self,
        entity: EntityType,
        selection: LinkSelection,
        limit: Option<usize>,
    ) -> Result<Vec<LinkRecord>> {
        let filter = match selection {
            LinkSelection::Untried => "WHERE tried = 0",
            LinkSelection::Failed => "WHERE tried = 1 AND success = 0",
            LinkSelection::All => "",
        };
        let sql = format!(
            "SELECT id, link, name, tried, success FROM {} {} ORDER BY id ASC LIMIT ?1",
            entity.table(),
            filter
        );
        debug!(sql = %sql, "Built read query");

        // A negative LIMIT means no limit in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = self.db.conn().prepare(&sql)?;
        let records = stmt
            .query_map(params![limit], row_to_link)?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read {} links", entity))?;

        info!(
            entity = %entity,
            selection = %selection,
            count = records.len(),
            "Read links from DB"
        );
        Ok(records)
    }

    fn record_attempt(
        &mut self,
        entity: EntityType,
        id: i64,
        tried: bool,
        success: bool,
    ) -> Result<()> {
        let success = tried.then_some(success);
        let conn = self.db.conn_mut();

        let updated = conn.execute(
            &format!(
                "UPDATE {}
                 SET tried = ?1, success = ?2, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?3 AND (tried IS NOT ?1 OR success IS NOT ?2)",
                entity.table()
            ),
            params![tried, success, id],
        )?;

        if updated == 0 {
            let exists: Option<i64> = conn
                .query_row(
                    &format!("SELECT id FROM {} WHERE id = ?1", entity.table()),
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                bail!("No {} row with id {}", entity, id);
            }
        }

        debug!(entity = %entity, id, tried, ?success, changed = updated > 0, "Updated status");
        Ok(())
    }

    fn insert_new(&mut self, entity: EntityType, link: &NewLink) -> Result<i64> {
        upsert(self.db.conn(), entity, link)
    }
}

/// Upsert by link, returning the row ID
fn upsert(conn: &rusqlite::Connection, entity: EntityType, link: &NewLink) -> Result<i64> {
    match entity {
        EntityType::Fight => {
            let (fighter_1_id, fighter_2_id) = match &link.fighters {
                Some([fighter_1, fighter_2]) => (
                    Some(fighter_id(conn, fighter_1)?),
                    Some(fighter_id(conn, fighter_2)?),
                ),
                None => (None, None),
            };
            conn.execute(
                "INSERT INTO fight (link, name, event_id, fighter_1_id, fighter_2_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(link) DO UPDATE SET
                     name = excluded.name,
                     event_id = COALESCE(excluded.event_id, fight.event_id),
                     fighter_1_id = COALESCE(excluded.fighter_1_id, fight.fighter_1_id),
                     fighter_2_id = COALESCE(excluded.fighter_2_id, fight.fighter_2_id)
                 WHERE fight.name IS NOT excluded.name
                    OR (excluded.event_id IS NOT NULL AND fight.event_id IS NOT excluded.event_id)
                    OR (excluded.fighter_1_id IS NOT NULL
                        AND fight.fighter_1_id IS NOT excluded.fighter_1_id)
                    OR (excluded.fighter_2_id IS NOT NULL
                        AND fight.fighter_2_id IS NOT excluded.fighter_2_id)",
                params![link.link, link.name, link.event_id, fighter_1_id, fighter_2_id],
            )
        }
        _ => conn.execute(
            &format!(
                "INSERT INTO {table} (link, name) VALUES (?1, ?2)
                 ON CONFLICT(link) DO UPDATE SET name = excluded.name
                 WHERE {table}.name IS NOT excluded.name",
                table = entity.table()
            ),
            params![link.link, link.name],
        ),
    }
    .with_context(|| format!("Failed to insert {} link {}", entity, link.link))?;

    let id: i64 = conn.query_row(
        &format!("SELECT id FROM {} WHERE link = ?1", entity.table()),
        params![link.link],
        |row| row.get(0),
    )?;

    debug!(entity = %entity, id, link = %link.link, "Upserted link");
    Ok(id)
}

/// Row ID of a fighter link that must already be stored
fn fighter_id(conn: &rusqlite::Connection, link: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row("SELECT id FROM fighter WHERE link = ?1", params![link], |row| row.get(0))
        .optional()
        .with_context(|| format!("Failed to look up fighter link {}", link))?;
    match id {
        Some(id) => Ok(id),
        None => bail!("Fighter link {} is not in the links database", link),
    }
}

/// Helper: Convert a database row to a LinkRecord
fn row_to_link(row: &rusqlite::Row) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        id: row.get(0)?,
        link: row.get(1)?,
        name: row.get(2)?,
        tried: row.get(3)?,
        success: row.get(4)?,
    })
}

/// Link statistics for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    pub total: usize,
    pub untried: usize,
    pub succeeded: usize,
    pub failed: usize,
}
