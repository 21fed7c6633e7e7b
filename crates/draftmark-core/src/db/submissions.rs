//! Student submission repository
//!
//! Submissions are append-only drafts. Grading status is tracked in the
//! explicit `grading_state` column; draft numbers are submission identity
//! and are never touched by the grading engine.

use super::assignments::parse_datetime;
use crate::error::{DraftmarkError, Result};
use crate::model::{GradingState, StudentSubmission};
use chrono::Utc;
use rusqlite::params;

fn submission_from_row(row: &rusqlite::Row) -> rusqlite::Result<StudentSubmission> {
    let state: String = row.get(6)?;
    Ok(StudentSubmission {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        student_id: row.get(2)?,
        draft_number: row.get(3)?,
        content: row.get(4)?,
        submission_date: parse_datetime(row.get(5)?, 5)?,
        grading_state: state.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
    })
}

const SUBMISSION_COLUMNS: &str =
    "id, assignment_id, student_id, draft_number, content, submission_date, grading_state";

impl super::Database {
    pub fn create_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        draft_number: i64,
        content: &str,
    ) -> Result<StudentSubmission> {
        self.find_assignment(assignment_id)?;
        self.find_student(student_id)?;

        let submission_date = Utc::now();
        self.conn
            .execute(
                "INSERT INTO submissions (assignment_id, student_id, draft_number, content, submission_date, grading_state)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'ungraded')",
                params![
                    assignment_id,
                    student_id,
                    draft_number,
                    content,
                    submission_date.to_rfc3339()
                ],
            )
            .map_err(|e| DraftmarkError::db_operation("insert submission", e))?;

        Ok(StudentSubmission {
            id: self.conn.last_insert_rowid(),
            assignment_id,
            student_id,
            draft_number,
            content: content.to_string(),
            submission_date,
            grading_state: GradingState::Ungraded,
        })
    }

    pub fn find_submission(&self, id: i64) -> Result<StudentSubmission> {
        let row = self.conn.query_row(
            &format!("SELECT {} FROM submissions WHERE id = ?1", SUBMISSION_COLUMNS),
            params![id],
            submission_from_row,
        );

        match row {
            Ok(submission) => Ok(submission),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("submission", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query submission", e)),
        }
    }

    pub fn submissions_for_assignment(&self, assignment_id: i64) -> Result<Vec<StudentSubmission>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM submissions WHERE assignment_id = ?1 ORDER BY id",
                SUBMISSION_COLUMNS
            ))
            .map_err(|e| DraftmarkError::db_operation("prepare submission list", e))?;

        let rows = stmt
            .query_map(params![assignment_id], submission_from_row)
            .map_err(|e| DraftmarkError::db_operation("list submissions", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read submission rows", e))
    }

    pub fn submissions_for_student(&self, student_id: i64) -> Result<Vec<StudentSubmission>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM submissions WHERE student_id = ?1 ORDER BY id",
                SUBMISSION_COLUMNS
            ))
            .map_err(|e| DraftmarkError::db_operation("prepare submission list", e))?;

        let rows = stmt
            .query_map(params![student_id], submission_from_row)
            .map_err(|e| DraftmarkError::db_operation("list submissions", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read submission rows", e))
    }

    /// The student's highest-numbered draft for an assignment
    pub fn latest_draft(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentSubmission>> {
        let row = self.conn.query_row(
            &format!(
                "SELECT {} FROM submissions WHERE assignment_id = ?1 AND student_id = ?2
                 ORDER BY draft_number DESC, id DESC LIMIT 1",
                SUBMISSION_COLUMNS
            ),
            params![assignment_id, student_id],
            submission_from_row,
        );

        match row {
            Ok(submission) => Ok(Some(submission)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DraftmarkError::db_operation("query latest draft", e)),
        }
    }
}
