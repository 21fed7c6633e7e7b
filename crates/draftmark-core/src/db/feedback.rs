//! Feedback repository
//!
//! A grading attempt produces a full set of feedback rows or none. The set
//! for a (submission, rubric version) pair is replaced wholesale on regrade;
//! rows tied to superseded versions are never touched, preserving history.

use super::assignments::parse_datetime;
use crate::error::{DraftmarkError, Result};
use crate::model::{Feedback, FeedbackDetail};
use chrono::Utc;
use rusqlite::params;

/// One parsed (criterion, score, feedback) triple ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedCriterion {
    pub criterion_id: i64,
    pub score: i64,
    pub feedback: String,
}

impl super::Database {
    /// Persist a complete grading pass atomically: drop any previous rows
    /// for this (submission, version), insert the fresh set, and mark the
    /// submission graded. Either every criterion lands or none do.
    pub fn replace_feedback_set(
        &self,
        submission_id: i64,
        rubric_version_id: i64,
        graded: &[GradedCriterion],
    ) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| DraftmarkError::transaction("begin feedback write", e))?;

        tx.execute(
            "DELETE FROM feedback WHERE submission_id = ?1 AND rubric_version_id = ?2",
            params![submission_id, rubric_version_id],
        )
        .map_err(|e| DraftmarkError::db_operation("clear previous feedback", e))?;

        let feedback_date = Utc::now().to_rfc3339();
        for item in graded {
            tx.execute(
                "INSERT INTO feedback (submission_id, criterion_id, rubric_version_id, ai_feedback, score, feedback_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    submission_id,
                    item.criterion_id,
                    rubric_version_id,
                    item.feedback,
                    item.score,
                    feedback_date
                ],
            )
            .map_err(|e| DraftmarkError::db_operation("insert feedback", e))?;
        }

        tx.execute(
            "UPDATE submissions SET grading_state = 'graded' WHERE id = ?1",
            params![submission_id],
        )
        .map_err(|e| DraftmarkError::db_operation("mark submission graded", e))?;

        tx.commit()
            .map_err(|e| DraftmarkError::transaction("commit feedback write", e))?;

        Ok(())
    }

    pub fn find_feedback(&self, id: i64) -> Result<Feedback> {
        let row = self.conn.query_row(
            "SELECT id, submission_id, criterion_id, rubric_version_id, ai_feedback, teacher_feedback, score, feedback_date
             FROM feedback WHERE id = ?1",
            params![id],
            |row| {
                Ok(Feedback {
                    id: row.get(0)?,
                    submission_id: row.get(1)?,
                    criterion_id: row.get(2)?,
                    rubric_version_id: row.get(3)?,
                    ai_feedback: row.get(4)?,
                    teacher_feedback: row.get(5)?,
                    score: row.get(6)?,
                    feedback_date: parse_datetime(row.get(7)?, 7)?,
                })
            },
        );

        match row {
            Ok(feedback) => Ok(feedback),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("feedback", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query feedback", e)),
        }
    }

    /// The rubric version of the submission's newest feedback row, i.e. the
    /// version of its most recent grading pass.
    pub fn latest_graded_version(&self, submission_id: i64) -> Result<Option<i64>> {
        let row = self.conn.query_row(
            "SELECT rubric_version_id FROM feedback WHERE submission_id = ?1
             ORDER BY feedback_date DESC, id DESC LIMIT 1",
            params![submission_id],
            |r| r.get(0),
        );

        match row {
            Ok(version_id) => Ok(Some(version_id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DraftmarkError::db_operation("query latest graded version", e)),
        }
    }

    /// Feedback rows for one grading pass, joined with their criteria so
    /// callers can compute totals against the criterion maxima.
    pub fn feedback_for_submission_version(
        &self,
        submission_id: i64,
        rubric_version_id: i64,
    ) -> Result<Vec<FeedbackDetail>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT f.id, f.criterion_id, c.name, c.max_score, f.score, f.ai_feedback, f.teacher_feedback, f.feedback_date
                 FROM feedback f
                 JOIN rubric_criteria c ON c.id = f.criterion_id
                 WHERE f.submission_id = ?1 AND f.rubric_version_id = ?2
                 ORDER BY f.criterion_id",
            )
            .map_err(|e| DraftmarkError::db_operation("prepare feedback query", e))?;

        let rows = stmt
            .query_map(params![submission_id, rubric_version_id], |row| {
                Ok(FeedbackDetail {
                    feedback_id: row.get(0)?,
                    criterion_id: row.get(1)?,
                    criterion_name: row.get(2)?,
                    max_score: row.get(3)?,
                    score: row.get(4)?,
                    ai_feedback: row.get(5)?,
                    teacher_feedback: row.get(6)?,
                    feedback_date: parse_datetime(row.get(7)?, 7)?,
                })
            })
            .map_err(|e| DraftmarkError::db_operation("query feedback rows", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read feedback rows", e))
    }

    /// Teacher override: replace the score and attach teacher feedback.
    /// The original AI feedback text is deliberately left untouched so the
    /// model's judgment and the correction coexist as an audit trail.
    pub fn review_feedback(
        &self,
        feedback_id: i64,
        score: i64,
        teacher_feedback: &str,
    ) -> Result<Feedback> {
        let feedback = self.find_feedback(feedback_id)?;
        let criterion = self.find_criterion(feedback.criterion_id)?;
        if score < 0 || score > criterion.max_score {
            return Err(DraftmarkError::invalid_value(
                "review score",
                format!("{} (expected 0..={})", score, criterion.max_score),
            ));
        }

        self.conn
            .execute(
                "UPDATE feedback SET score = ?1, teacher_feedback = ?2 WHERE id = ?3",
                params![score, teacher_feedback, feedback_id],
            )
            .map_err(|e| DraftmarkError::db_operation("update feedback review", e))?;

        self.find_feedback(feedback_id)
    }
}
