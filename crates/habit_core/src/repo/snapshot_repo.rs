//! Snapshot repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and save the full habit collection under one durable key.
//! - Optionally stamp the snapshot with a caller-chosen version string.
//!
//! # Invariants
//! - A missing snapshot loads as an empty collection.
//! - `save` is one IMMEDIATE transaction: a reload observes either the old
//!   snapshot or the new one, never a mix.
//! - `save` takes `&mut self`, so saves through one repository never overlap.

use crate::db::{DbError, KV_STORE_TABLE};
use crate::model::habit::{Habit, HabitValidationError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Durable key holding the serialized habit array.
pub const HABITS_KEY: &str = "habits";
/// Durable key holding the optional snapshot version stamp.
pub const HABITS_VERSION_KEY: &str = "habits.version";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-layer failure for snapshot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "habit snapshot is not valid JSON: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Whole-collection persistence contract.
pub trait SnapshotRepository {
    /// Reads the persisted collection; empty when nothing was saved yet.
    fn load(&self) -> RepoResult<Vec<Habit>>;

    /// Overwrites the persisted collection and, when given, its version stamp.
    fn save_snapshot(&mut self, habits: &[Habit], version: Option<&str>) -> RepoResult<()>;

    /// Reads the version stamp saved alongside the snapshot.
    fn load_version(&self) -> RepoResult<Option<String>>;

    /// Overwrites the persisted collection, leaving any version stamp as-is.
    fn save(&mut self, habits: &[Habit]) -> RepoResult<()> {
        self.save_snapshot(habits, None)
    }
}

/// SQLite-backed snapshot repository over the `kv_store` table.
pub struct SqliteSnapshotRepository {
    conn: Connection,
}

impl SqliteSnapshotRepository {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - Returns `InvalidData` when the `kv_store` table is missing, i.e. the
    ///   connection was not bootstrapped through the db module.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [KV_STORE_TABLE],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(RepoError::InvalidData(
                "kv_store table missing; open the database through db::open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn read_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl SnapshotRepository for SqliteSnapshotRepository {
    fn load(&self) -> RepoResult<Vec<Habit>> {
        let started_at = Instant::now();
        let Some(raw) = self.read_value(HABITS_KEY)? else {
            info!("event=snapshot_load module=repo status=ok habit_count=0 snapshot=absent");
            return Ok(Vec::new());
        };

        let habits = decode_snapshot(&raw).inspect_err(|err| {
            error!(
                "event=snapshot_load module=repo status=error bytes={} error={err}",
                raw.len()
            );
        })?;

        info!(
            "event=snapshot_load module=repo status=ok habit_count={} bytes={} duration_ms={}",
            habits.len(),
            raw.len(),
            started_at.elapsed().as_millis()
        );
        Ok(habits)
    }

    fn save_snapshot(&mut self, habits: &[Habit], version: Option<&str>) -> RepoResult<()> {
        let started_at = Instant::now();
        let payload = serde_json::to_string(habits)?;
        let now_ms = epoch_millis();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        upsert(&tx, HABITS_KEY, &payload, now_ms)?;
        if let Some(version) = version {
            upsert(&tx, HABITS_VERSION_KEY, version, now_ms)?;
        }
        tx.commit()?;

        info!(
            "event=snapshot_save module=repo status=ok habit_count={} bytes={} duration_ms={}",
            habits.len(),
            payload.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn load_version(&self) -> RepoResult<Option<String>> {
        self.read_value(HABITS_VERSION_KEY)
    }
}

/// Parses and validates a serialized habit array.
pub fn decode_snapshot(raw: &str) -> RepoResult<Vec<Habit>> {
    let habits: Vec<Habit> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(habits.len());
    for habit in &habits {
        habit.validate().map_err(|err: HabitValidationError| {
            RepoError::InvalidData(format!("habit `{}`: {err}", habit.id))
        })?;
        if !seen.insert(&habit.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate habit id `{}`",
                habit.id
            )));
        }
    }
    Ok(habits)
}

fn upsert(conn: &Connection, key: &str, value: &str, now_ms: i64) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value, now_ms],
    )?;
    Ok(())
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, RepoError};

    #[test]
    fn decode_rejects_duplicate_ids() {
        let raw = r#"[
            {"id":"1","name":"A","description":"","category":"health","createdAt":"2024-01-01T00:00:00Z","completions":{}},
            {"id":"1","name":"B","description":"","category":"social","createdAt":"2024-01-01T00:00:00Z","completions":{}}
        ]"#;
        let err = decode_snapshot(raw).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("duplicate")));
    }

    #[test]
    fn decode_rejects_blank_names() {
        let raw = r#"[{"id":"1","name":"  ","category":"health","createdAt":"2024-01-01T00:00:00Z"}]"#;
        assert!(matches!(
            decode_snapshot(raw).unwrap_err(),
            RepoError::InvalidData(_)
        ));
    }

    #[test]
    fn decode_reports_malformed_json() {
        assert!(matches!(
            decode_snapshot("{not json").unwrap_err(),
            RepoError::Serialization(_)
        ));
    }
}
