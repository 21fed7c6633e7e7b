//! Rubric version repository
//!
//! Invariant: at most one active version per assignment. Both creation and
//! activation run deactivate-all + activate-one inside a single transaction
//! so concurrent callers can never observe two active versions or none.

use super::assignments::parse_datetime;
use crate::error::{DraftmarkError, Result};
use crate::model::RubricVersion;
use chrono::Utc;
use rusqlite::params;

fn version_from_row(row: &rusqlite::Row) -> rusqlite::Result<RubricVersion> {
    Ok(RubricVersion {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        template_id: row.get(2)?,
        version_number: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        created_date: parse_datetime(row.get(5)?, 5)?,
    })
}

const VERSION_COLUMNS: &str =
    "id, assignment_id, template_id, version_number, is_active, created_date";

impl super::Database {
    /// Bind a template to an assignment as a new version. The new version
    /// number is one past the assignment's current maximum (1 if none) and
    /// the new version becomes the only active one.
    pub fn create_new_version(&self, assignment_id: i64, template_id: i64) -> Result<RubricVersion> {
        self.find_assignment(assignment_id)?;
        self.find_template(template_id)?;

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DraftmarkError::transaction("begin version create", e))?;

        let next_number: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(version_number), 0) + 1 FROM rubric_versions
                 WHERE assignment_id = ?1",
                params![assignment_id],
                |r| r.get(0),
            )
            .map_err(|e| DraftmarkError::db_operation("compute next version number", e))?;

        tx.execute(
            "UPDATE rubric_versions SET is_active = 0 WHERE assignment_id = ?1",
            params![assignment_id],
        )
        .map_err(|e| DraftmarkError::db_operation("deactivate rubric versions", e))?;

        let created_date = Utc::now();
        tx.execute(
            "INSERT INTO rubric_versions (assignment_id, template_id, version_number, is_active, created_date)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![assignment_id, template_id, next_number, created_date.to_rfc3339()],
        )
        .map_err(|e| DraftmarkError::db_operation("insert rubric version", e))?;

        let id = tx.last_insert_rowid();
        tx.commit()
            .map_err(|e| DraftmarkError::transaction("commit version create", e))?;

        tracing::debug!(
            assignment_id,
            template_id,
            version_number = next_number,
            "created rubric version"
        );

        Ok(RubricVersion {
            id,
            assignment_id,
            template_id,
            version_number: next_number,
            is_active: true,
            created_date,
        })
    }

    /// Make one existing version the active one for its assignment.
    /// Idempotent: activating the already-active version is a no-op that
    /// still leaves exactly one active version.
    pub fn set_active_version(&self, version_id: i64, assignment_id: i64) -> Result<RubricVersion> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DraftmarkError::transaction("begin version activation", e))?;

        let belongs: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM rubric_versions WHERE id = ?1 AND assignment_id = ?2",
                params![version_id, assignment_id],
                |r| r.get(0),
            )
            .map_err(|e| DraftmarkError::db_operation("check version ownership", e))?;
        if belongs == 0 {
            return Err(DraftmarkError::not_found("rubric version", version_id));
        }

        tx.execute(
            "UPDATE rubric_versions SET is_active = 0 WHERE assignment_id = ?1",
            params![assignment_id],
        )
        .map_err(|e| DraftmarkError::db_operation("deactivate rubric versions", e))?;

        tx.execute(
            "UPDATE rubric_versions SET is_active = 1 WHERE id = ?1",
            params![version_id],
        )
        .map_err(|e| DraftmarkError::db_operation("activate rubric version", e))?;

        tx.commit()
            .map_err(|e| DraftmarkError::transaction("commit version activation", e))?;

        self.find_version(version_id)
    }

    pub fn find_version(&self, id: i64) -> Result<RubricVersion> {
        let row = self.conn.query_row(
            &format!("SELECT {} FROM rubric_versions WHERE id = ?1", VERSION_COLUMNS),
            params![id],
            version_from_row,
        );

        match row {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("rubric version", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query rubric version", e)),
        }
    }

    /// The single active version for an assignment, or `None` when the
    /// assignment has never had a rubric bound. Callers grading a submission
    /// treat `None` as a precondition failure, not something to skip.
    pub fn find_active_version(&self, assignment_id: i64) -> Result<Option<RubricVersion>> {
        let row = self.conn.query_row(
            &format!(
                "SELECT {} FROM rubric_versions WHERE assignment_id = ?1 AND is_active = 1",
                VERSION_COLUMNS
            ),
            params![assignment_id],
            version_from_row,
        );

        match row {
            Ok(version) => Ok(Some(version)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DraftmarkError::db_operation("query active rubric version", e)),
        }
    }

    pub fn list_versions(&self, assignment_id: i64) -> Result<Vec<RubricVersion>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM rubric_versions WHERE assignment_id = ?1 ORDER BY version_number",
                VERSION_COLUMNS
            ))
            .map_err(|e| DraftmarkError::db_operation("prepare version list", e))?;

        let rows = stmt
            .query_map(params![assignment_id], version_from_row)
            .map_err(|e| DraftmarkError::db_operation("list rubric versions", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read rubric version rows", e))
    }
}
