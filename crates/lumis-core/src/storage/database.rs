//! SQLite-based progress history and state storage.
//!
//! Provides persistent storage for:
//! - Archived daily progress records (one row per local day)
//! - Completion statistics (today and all-time)
//! - Key-value store for serialized application state
//!
//! The archive write is `INSERT OR REPLACE` keyed on the date, so a
//! replayed rollover cannot duplicate a day.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::tracker::DailyProgress;

use super::data_dir;

/// One archived day as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedDay {
    pub date_key: String,
    pub light_minutes: f64,
    pub steps: u32,
    pub completed: bool,
    pub completed_via_override: bool,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub days_tracked: u64,
    pub days_completed: u64,
    pub days_completed_via_override: u64,
    pub total_light_min: f64,
    pub today_light_min: f64,
    pub today_completed: bool,
}

/// SQLite database for progress storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/lumis/lumis.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::DataDirUnavailable(e.to_string()))?
            .join("lumis.db");
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS progress_history (
                date_key    TEXT PRIMARY KEY,
                light_minutes REAL NOT NULL,
                steps       INTEGER NOT NULL DEFAULT 0,
                completed   INTEGER NOT NULL,
                completed_via_override INTEGER NOT NULL DEFAULT 0,
                archived_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_progress_completed ON progress_history(completed);",
        )?;
        Ok(())
    }

    /// Archive a frozen daily record.
    ///
    /// Replaces any existing row for the same date, keeping rollover
    /// replay-safe.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn archive_day(&self, day: &DailyProgress) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO progress_history
                (date_key, light_minutes, steps, completed, completed_via_override, archived_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                day.date_key,
                day.light_minutes,
                day.steps,
                day.completed as i64,
                day.completed_via_override as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent archived days, newest first.
    pub fn recent_days(&self, limit: usize) -> Result<Vec<ArchivedDay>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT date_key, light_minutes, steps, completed, completed_via_override, archived_at
             FROM progress_history
             ORDER BY date_key DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ArchivedDay {
                date_key: row.get(0)?,
                light_minutes: row.get(1)?,
                steps: row.get(2)?,
                completed: row.get::<_, i64>(3)? != 0,
                completed_via_override: row.get::<_, i64>(4)? != 0,
                archived_at: row
                    .get::<_, String>(5)?
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;
        rows.collect()
    }

    /// All archived days, oldest first. Used by the sync push.
    pub fn all_days(&self) -> Result<Vec<DailyProgress>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT date_key, light_minutes, steps, completed, completed_via_override
             FROM progress_history
             ORDER BY date_key ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyProgress {
                date_key: row.get(0)?,
                light_minutes: row.get(1)?,
                steps: row.get(2)?,
                completed: row.get::<_, i64>(3)? != 0,
                completed_via_override: row.get::<_, i64>(4)? != 0,
            })
        })?;
        rows.collect()
    }

    /// Aggregate stats across the archive plus today's live record.
    pub fn stats(&self, today: &DailyProgress) -> Result<Stats, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*),
                    COALESCE(SUM(completed), 0),
                    COALESCE(SUM(completed_via_override), 0),
                    COALESCE(SUM(light_minutes), 0)
             FROM progress_history
             WHERE date_key != ?1",
        )?;
        let (days, completed, via_override, total_min) = stmt.query_row(
            params![today.date_key],
            |row| {
                Ok((
                    row.get::<_, u64>(0)?,
                    row.get::<_, u64>(1)?,
                    row.get::<_, u64>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            },
        )?;

        Ok(Stats {
            days_tracked: days + 1,
            days_completed: completed + u64::from(today.completed),
            days_completed_via_override: via_override + u64::from(today.completed_via_override),
            total_light_min: total_min + today.light_minutes,
            today_light_min: today.light_minutes,
            today_completed: today.completed,
        })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
