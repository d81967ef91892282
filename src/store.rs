use crate::app_dirs::AppDirs;
use crate::keystroke::KeystrokeEvent;
use crate::metrics::PerformanceMetrics;
use crate::session::TypingSession;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// SQLite-backed session history
#[derive(Debug)]
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Opens the database at its default location under
    /// `$HOME/.local/state/kadans`, creating directories and schema as needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("kadans_sessions.db"));
        Self::open(db_path)
    }

    /// Opens (or creates) the database at an explicit path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                started_at TEXT NOT NULL,
                duration_ms INTEGER NOT NULL,
                reference TEXT NOT NULL,
                typed TEXT NOT NULL,
                events TEXT NOT NULL,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                error_rate INTEGER NOT NULL,
                total_keystrokes INTEGER NOT NULL,
                correct_keystrokes INTEGER NOT NULL,
                incorrect_keystrokes INTEGER NOT NULL,
                mean_keystroke_ms INTEGER NOT NULL,
                keystroke_std_dev_ms INTEGER NOT NULL,
                tremor_score INTEGER NOT NULL,
                fatigue_detected BOOLEAN NOT NULL,
                fatigue_score INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at)",
            [],
        )?;

        Ok(SessionStore { conn })
    }

    pub fn insert(&self, session: &TypingSession) -> Result<()> {
        let events = serde_json::to_string(&session.events).map_err(|_| {
            rusqlite::Error::InvalidColumnType(5, "events".to_string(), rusqlite::types::Type::Text)
        })?;

        let m = &session.metrics;
        self.conn.execute(
            r#"
            INSERT INTO sessions
            (id, started_at, duration_ms, reference, typed, events,
             wpm, accuracy, error_rate, total_keystrokes, correct_keystrokes,
             incorrect_keystrokes, mean_keystroke_ms, keystroke_std_dev_ms,
             tremor_score, fatigue_detected, fatigue_score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                session.id.to_string(),
                session.started_at.to_rfc3339(),
                session.duration_ms as i64,
                session.reference,
                session.typed,
                events,
                m.wpm,
                m.accuracy,
                m.error_rate,
                m.total_keystrokes as i64,
                m.correct_keystrokes as i64,
                m.incorrect_keystrokes as i64,
                m.mean_keystroke_ms as i64,
                m.keystroke_std_dev_ms as i64,
                m.tremor_score,
                m.fatigue_detected,
                m.fatigue_score,
            ],
        )?;

        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<TypingSession>> {
        self.conn
            .query_row(
                "SELECT * FROM sessions WHERE id = ?1",
                [id.to_string()],
                row_to_session,
            )
            .optional()
    }

    /// All sessions, newest first
    pub fn all(&self) -> Result<Vec<TypingSession>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM sessions ORDER BY started_at DESC")?;

        let session_iter = stmt.query_map([], row_to_session)?;

        let mut sessions = Vec::new();
        for session in session_iter {
            sessions.push(session?);
        }

        Ok(sessions)
    }

    /// Returns whether a row existed
    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", [id.to_string()])?;
        Ok(removed > 0)
    }

    /// Returns the number of rows removed
    pub fn clear(&self) -> Result<usize> {
        self.conn.execute("DELETE FROM sessions", [])
    }
}

fn row_to_session(row: &Row) -> Result<TypingSession> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "id".to_string(), rusqlite::types::Type::Text)
    })?;

    let started_str: String = row.get(1)?;
    let started_at = DateTime::parse_from_rfc3339(&started_str)
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                1,
                "started_at".to_string(),
                rusqlite::types::Type::Text,
            )
        })?
        .with_timezone(&Local);

    let events_json: String = row.get(5)?;
    let events: Vec<KeystrokeEvent> = serde_json::from_str(&events_json).map_err(|_| {
        rusqlite::Error::InvalidColumnType(5, "events".to_string(), rusqlite::types::Type::Text)
    })?;

    Ok(TypingSession {
        id,
        started_at,
        duration_ms: row.get::<_, i64>(2)? as u64,
        reference: row.get(3)?,
        typed: row.get(4)?,
        events,
        metrics: PerformanceMetrics {
            wpm: row.get(6)?,
            accuracy: row.get(7)?,
            error_rate: row.get(8)?,
            total_keystrokes: row.get::<_, i64>(9)? as usize,
            correct_keystrokes: row.get::<_, i64>(10)? as usize,
            incorrect_keystrokes: row.get::<_, i64>(11)? as usize,
            mean_keystroke_ms: row.get::<_, i64>(12)? as u64,
            keystroke_std_dev_ms: row.get::<_, i64>(13)? as u64,
            tremor_score: row.get(14)?,
            fatigue_detected: row.get(15)?,
            fatigue_score: row.get(16)?,
        },
    })
}
