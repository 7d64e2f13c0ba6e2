#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Durable event log of dispense sessions.
//!
//! One SQLite table of `DispenseSession` rows keyed by an auto-incrementing
//! id. The store is the sole owner of session identity and lifecycle: rows
//! are created by a start, mutated by progress/stop/complete (always located
//! as "most recent IN_PROGRESS"), and deleted only by the explicit
//! clear/delete operations, which are unconditional and status-blind.
//!
//! Every public operation takes the connection mutex and runs as a single
//! transaction, so each call is atomic from the caller's point of view.
//! The schema is managed by versioned, additive-only migrations applied
//! once at open via `PRAGMA user_version`.

pub mod error;

pub use error::{Result, StoreError};

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Terminal and non-terminal states of a dispense session.
///
/// `Other` carries statuses written by newer schema revisions so that
/// history listing stays readable across versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Completed,
    EmergencyStop,
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::EmergencyStop => "EMERGENCY_STOP",
            SessionStatus::Other(s) => s,
        }
    }

    fn from_db(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => SessionStatus::InProgress,
            "COMPLETED" => SessionStatus::Completed,
            "EMERGENCY_STOP" => SessionStatus::EmergencyStop,
            other => SessionStatus::Other(other.to_string()),
        }
    }
}

/// One dispense attempt from start to terminal outcome.
#[derive(Debug, Clone)]
pub struct DispenseSession {
    pub id: i64,
    pub start_time: String,
    pub end_time: Option<String>,
    pub target_water_ml: f64,
    pub dispensed_water_ml: f64,
    pub target_syrup_ml: f64,
    pub dispensed_syrup_ml: f64,
    pub status: SessionStatus,
    pub stop_reason: Option<String>,
}

/// Versioned, additive-only schema migrations. Index i migrates
/// user_version i -> i+1.
const MIGRATIONS: &[&str] = &[
    // v1: initial dispensing log
    "CREATE TABLE dispensing_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time TEXT NOT NULL,
        end_time TEXT,
        target_water_ml REAL NOT NULL DEFAULT 0,
        dispensed_water_ml REAL NOT NULL DEFAULT 0,
        target_syrup_ml REAL NOT NULL DEFAULT 0,
        dispensed_syrup_ml REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL
    )",
    // v2: emergency stop reason
    "ALTER TABLE dispensing_log ADD COLUMN stop_reason TEXT",
];

fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// SQLite-backed log of dispense sessions.
pub struct EventLog {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").finish_non_exhaustive()
    }
}

impl EventLog {
    /// Open (or create) the log at `path` and bring the schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory log for tests and development.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Persistence("store mutex poisoned".to_string()))
    }

    /// Current schema version (`PRAGMA user_version`).
    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.lock()?;
        let v: i64 = conn.query_row("SELECT user_version FROM pragma_user_version", [], |row| {
            row.get(0)
        })?;
        Ok(v as u32)
    }

    /// Insert a new IN_PROGRESS session and return its id.
    ///
    /// The check for an existing active session runs inside the same
    /// transaction as the insert, so two concurrent starts cannot both
    /// succeed.
    pub fn create_session(&self, target_water_ml: f64, target_syrup_ml: f64) -> Result<i64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if active_id(&tx)?.is_some() {
            return Err(StoreError::SessionActive);
        }
        tx.execute(
            "INSERT INTO dispensing_log (
                start_time,
                target_water_ml,
                dispensed_water_ml,
                target_syrup_ml,
                dispensed_syrup_ml,
                status
            ) VALUES (?1, ?2, 0, ?3, 0, 'IN_PROGRESS')",
            params![now_stamp(), target_water_ml, target_syrup_ml],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!(id, target_water_ml, target_syrup_ml, "session created");
        Ok(id)
    }

    /// The session with the highest id among IN_PROGRESS rows, if any.
    ///
    /// This is the sole mechanism for locating "the current session";
    /// progress/stop/complete requests carry no session identifier.
    pub fn find_active(&self) -> Result<Option<DispenseSession>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM dispensing_log
                     WHERE status = 'IN_PROGRESS' ORDER BY id DESC LIMIT 1"
                ),
                [],
                map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Record last-reported progress on the active session; no-op when none.
    pub fn update_progress(&self, dispensed_water_ml: f64, dispensed_syrup_ml: f64) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if let Some(id) = active_id(&tx)? {
            tx.execute(
                "UPDATE dispensing_log
                 SET dispensed_water_ml = ?1, dispensed_syrup_ml = ?2
                 WHERE id = ?3",
                params![dispensed_water_ml, dispensed_syrup_ml, id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Terminal transition IN_PROGRESS -> COMPLETED; no-op when no active row.
    pub fn mark_completed(&self) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if let Some(id) = active_id(&tx)? {
            tx.execute(
                "UPDATE dispensing_log SET end_time = ?1, status = 'COMPLETED' WHERE id = ?2",
                params![now_stamp(), id],
            )?;
            tracing::debug!(id, "session completed");
        }
        tx.commit()?;
        Ok(())
    }

    /// Terminal transition IN_PROGRESS -> EMERGENCY_STOP; no-op when no
    /// active row.
    pub fn mark_emergency_stop(&self, reason: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if let Some(id) = active_id(&tx)? {
            tx.execute(
                "UPDATE dispensing_log
                 SET end_time = ?1, status = 'EMERGENCY_STOP', stop_reason = ?2
                 WHERE id = ?3",
                params![now_stamp(), reason, id],
            )?;
            tracing::warn!(id, reason, "session emergency-stopped");
        }
        tx.commit()?;
        Ok(())
    }

    /// All sessions, most-recent id first.
    pub fn list_history(&self) -> Result<Vec<DispenseSession>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM dispensing_log ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map([], map_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    /// Delete all sessions unconditionally.
    pub fn clear_history(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM dispensing_log", [])?;
        Ok(())
    }

    /// Delete one record unconditionally; a missing id is not an error.
    pub fn delete_session(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM dispensing_log WHERE id = ?1", params![id])?;
        Ok(())
    }
}

const COLUMNS: &str = "id, start_time, end_time, target_water_ml, dispensed_water_ml, \
                       target_syrup_ml, dispensed_syrup_ml, status, stop_reason";

fn active_id(conn: &Connection) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM dispensing_log
             WHERE status = 'IN_PROGRESS' ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DispenseSession> {
    let status: String = row.get(7)?;
    Ok(DispenseSession {
        id: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        target_water_ml: row.get(3)?,
        dispensed_water_ml: row.get(4)?,
        target_syrup_ml: row.get(5)?,
        dispensed_syrup_ml: row.get(6)?,
        status: SessionStatus::from_db(&status),
        stop_reason: row.get(8)?,
    })
}

fn migrate(conn: &Connection) -> Result<()> {
    let version: i64 =
        conn.query_row("SELECT user_version FROM pragma_user_version", [], |row| {
            row.get(0)
        })?;
    let applied = usize::try_from(version)
        .map_err(|_| StoreError::Persistence(format!("bad schema version {version}")))?;
    if applied > MIGRATIONS.len() {
        return Err(StoreError::Persistence(format!(
            "database schema version {applied} is newer than this build supports"
        )));
    }
    for (i, sql) in MIGRATIONS.iter().enumerate().skip(applied) {
        let next = i + 1;
        conn.execute_batch(&format!(
            "BEGIN; {sql}; PRAGMA user_version = {next}; COMMIT;"
        ))?;
        tracing::info!(version = next, "applied event log migration");
    }
    Ok(())
}
