//! SQLite persistence layer for draftmark
//!
//! All repository methods live on [`Database`], grouped per concern in the
//! submodules. The grading engine depends only on these method contracts.

mod assignments;
mod feedback;
mod schema;
mod submissions;
mod templates;
mod versions;

use crate::error::{DraftmarkError, Result};
use rusqlite::Connection;
use std::path::Path;

pub use feedback::GradedCriterion;
pub use schema::create_schema;

pub const DB_FILE: &str = "draftmark.db";

/// SQLite database for draftmark
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at the given store root
    pub fn open(store_root: &Path) -> Result<Self> {
        let db_path = store_root.join(DB_FILE);

        let conn = Connection::open(&db_path).map_err(|e| {
            DraftmarkError::Other(format!(
                "failed to open database at {}: {}",
                db_path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DraftmarkError::Other(format!("failed to enable WAL mode: {}", e)))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| DraftmarkError::Other(format!("failed to enable foreign keys: {}", e)))?;

        create_schema(&conn)
            .map_err(|e| DraftmarkError::Other(format!("failed to create database schema: {}", e)))?;

        Ok(Database { conn })
    }

    /// Open an in-memory database (tests and dry runs)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DraftmarkError::Other(format!("failed to open in-memory database: {}", e)))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| DraftmarkError::Other(format!("failed to enable foreign keys: {}", e)))?;
        create_schema(&conn)
            .map_err(|e| DraftmarkError::Other(format!("failed to create database schema: {}", e)))?;
        Ok(Database { conn })
    }

    pub fn get_schema_version(&self) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'schema_version'",
                [],
                |r| {
                    let s: String = r.get(0)?;
                    Ok(s.parse().unwrap_or(0))
                },
            )
            .map_err(|e| DraftmarkError::db_operation("get schema version", e))
    }

    pub fn get_submission_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM submissions", [], |r| r.get(0))
            .map_err(|e| DraftmarkError::db_operation("get submission count", e))
    }

    pub fn get_feedback_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM feedback", [], |r| r.get(0))
            .map_err(|e| DraftmarkError::db_operation("get feedback count", e))
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Checkpoint WAL so rapid open/close cycles observe committed data.
        // wal_checkpoint returns a result row, so it must be read as a query.
        let _ = self
            .conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()));
    }
}

#[cfg(test)]
mod tests;
