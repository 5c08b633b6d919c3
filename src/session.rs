use crate::app_dirs::AppDirs;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};

/// Storage key for the single persisted instant.
const START_KEY: &str = "start-ms";

/// Durable key-value store holding at most one start instant.
///
/// One row: string key, string-encoded epoch milliseconds.
#[derive(Debug)]
pub struct SessionDb {
    conn: Connection,
}

impl SessionDb {
    /// Open the store at the platform state directory, creating it if needed.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("klok_session.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::init(Connection::open(path)?)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(SessionDb { conn })
    }

    /// Persist `ms` as the active start instant, replacing any previous one.
    pub fn save_start(&self, ms: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO session (key, value) VALUES (?1, ?2)",
            params![START_KEY, ms.to_string()],
        )?;

        Ok(())
    }

    /// Remove the persisted start instant, if any.
    pub fn clear_start(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM session WHERE key = ?1", params![START_KEY])?;

        Ok(())
    }

    /// Previously persisted start instant. A row that does not parse back to
    /// an integer is treated as absent rather than an error.
    pub fn load_start(&self) -> Result<Option<i64>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                params![START_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.and_then(|v| v.parse::<i64>().ok()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No active start instant.
    Unset,
    /// Counting from a persisted start instant.
    Running,
}

/// The single session owned by the composition root.
///
/// Wraps the store plus the in-memory active instant. When the store is
/// unavailable (or a write fails) the session keeps working in memory only.
#[derive(Debug)]
pub struct Session {
    db: Option<SessionDb>,
    start_ms: Option<i64>,
}

impl Session {
    /// Restore the persisted instant, or fall back to `default_start_ms` and
    /// persist that (so the next run restores it from the store).
    pub fn open(db: Option<SessionDb>, default_start_ms: Option<i64>) -> Self {
        let persisted = db.as_ref().and_then(|d| d.load_start().ok().flatten());

        let mut session = Self { db, start_ms: None };
        match persisted.filter(|ms| *ms > 0) {
            Some(ms) => session.start_ms = Some(ms),
            None => {
                if let Some(default_ms) = default_start_ms {
                    session.start(default_ms);
                }
            }
        }

        session
    }

    /// Start (or re-start) counting from `ms`. Invalid instants (<= 0) are
    /// swallowed: the call is a no-op and prior state is left untouched.
    pub fn start(&mut self, ms: i64) {
        if ms <= 0 {
            return;
        }

        if let Some(ref db) = self.db {
            let _ = db.save_start(ms);
        }
        self.start_ms = Some(ms);
    }

    /// Clear the active instant and its persisted copy.
    pub fn reset(&mut self) {
        if let Some(ref db) = self.db {
            let _ = db.clear_start();
        }
        self.start_ms = None;
    }

    pub fn start_ms(&self) -> Option<i64> {
        self.start_ms
    }

    pub fn state(&self) -> SessionState {
        if self.start_ms.is_some() {
            SessionState::Running
        } else {
            SessionState::Unset
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_ms.is_some()
    }
}
