//! Attempt repository layer
//!
//! Query and insert operations over the attempts table. A single connection
//! behind a mutex is enough for the access patterns here.

use crate::error::{Error, Result};
use crate::types::{AnalysisAttempt, AttemptDraft, AttemptStatus, DomainVariant};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use uuid::Uuid;

/// Storage health snapshot for status reporting.
#[derive(Debug, Clone, Default)]
pub struct StoreHealth {
    /// Database file size in bytes (0 for in-memory)
    pub database_size_bytes: u64,
    /// Total recorded attempts
    pub total_attempts: i64,
    /// Attempts that produced a decoded payload
    pub success_count: i64,
    /// Attempts that failed at any stage
    pub error_count: i64,
}

/// Persistence seam for recorded attempts.
///
/// The pipeline only ever appends; listing, lookup and deletion back the
/// history surface.
pub trait AttemptStore: Send + Sync {
    /// Record one attempt, returning its generated id.
    fn append(&self, draft: &AttemptDraft) -> Result<String>;

    /// All attempts, newest first.
    fn list(&self) -> Result<Vec<AnalysisAttempt>>;

    /// Look up a single attempt by id.
    fn get(&self, id: &str) -> Result<Option<AnalysisAttempt>>;

    /// Delete an attempt. Unknown ids are an error.
    fn delete(&self, id: &str) -> Result<()>;

    /// Aggregate counts for status reporting.
    fn health(&self) -> Result<StoreHealth>;
}

/// Database handle with a single pooled connection
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL keeps readers usable while an append is in flight
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.clone()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    fn row_to_attempt(row: &Row) -> rusqlite::Result<AnalysisAttempt> {
        let created_at_str: String = row.get("created_at")?;
        let variant_str: String = row.get("variant")?;
        let result_str: String = row.get("result")?;
        let status_str: String = row.get("status")?;

        let status = AttemptStatus::from_storage(&status_str);
        let result = match status {
            AttemptStatus::Success => serde_json::from_str(&result_str).ok(),
            AttemptStatus::Error => None,
        };

        Ok(AnalysisAttempt {
            id: row.get("id")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            variant: DomainVariant::from_str(&variant_str).unwrap_or_default(),
            input_text: row.get("input_text")?,
            result,
            status,
            error_message: row.get("error_message")?,
        })
    }
}

impl AttemptStore for Database {
    fn append(&self, draft: &AttemptDraft) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let result_json = match &draft.result {
            Some(result) => serde_json::to_string(result)?,
            None => "{}".to_string(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO attempts (id, created_at, variant, input_text, result, status, error_message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                created_at.to_rfc3339(),
                draft.variant.as_str(),
                draft.input_text,
                result_json,
                draft.status().as_str(),
                draft.error_message,
            ],
        )?;

        Ok(id)
    }

    fn list(&self) -> Result<Vec<AnalysisAttempt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM attempts ORDER BY created_at DESC, rowid DESC",
        )?;
        let attempts = stmt
            .query_map([], Self::row_to_attempt)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attempts)
    }

    fn get(&self, id: &str) -> Result<Option<AnalysisAttempt>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM attempts WHERE id = ?", [id], Self::row_to_attempt)
            .optional()
            .map_err(Error::from)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM attempts WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(Error::Store(format!("no attempt with id {}", id)));
        }
        Ok(())
    }

    fn health(&self) -> Result<StoreHealth> {
        let database_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        let conn = self.conn.lock().unwrap();
        let (total_attempts, success_count, error_count) = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'success'),
                   COUNT(*) FILTER (WHERE status = 'error')
            FROM attempts
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(StoreHealth {
            database_size_bytes,
            total_attempts,
            success_count,
            error_count,
        })
    }
}
