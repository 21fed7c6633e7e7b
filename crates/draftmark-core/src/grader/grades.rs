//! Grade aggregation and teacher review
//!
//! Totals are computed over the submission's most recent grading pass (the
//! rubric version of its newest feedback row), so rows from superseded
//! versions never mix into one total.

use crate::db::Database;
use crate::error::{DraftmarkError, Result};
use crate::model::{Feedback, SubmissionGrade};

/// Aggregate the stored feedback for one submission. Fails with NotFound
/// when grading never ran.
pub fn submission_grade(db: &Database, submission_id: i64) -> Result<SubmissionGrade> {
    // Surface a submission-level NotFound before the feedback-level one
    db.find_submission(submission_id)?;

    let version_id = db
        .latest_graded_version(submission_id)?
        .ok_or_else(|| DraftmarkError::not_found("feedback for submission", submission_id))?;

    let feedback = db.feedback_for_submission_version(submission_id, version_id)?;

    let total_score: i64 = feedback.iter().map(|f| f.score).sum();
    let max_possible_score: i64 = feedback.iter().map(|f| f.max_score).sum();
    let percentage = if max_possible_score == 0 {
        0.0
    } else {
        total_score as f64 / max_possible_score as f64 * 100.0
    };

    Ok(SubmissionGrade {
        submission_id,
        rubric_version_id: version_id,
        feedback,
        total_score,
        max_possible_score,
        percentage,
    })
}

/// Grades for every submission of an assignment. Best-effort: submissions
/// without feedback (or whose lookup fails) are logged and omitted rather
/// than failing the batch.
pub fn assignment_grades(db: &Database, assignment_id: i64) -> Result<Vec<SubmissionGrade>> {
    db.find_assignment(assignment_id)?;

    let submissions = db.submissions_for_assignment(assignment_id)?;
    let mut grades = Vec::new();

    for submission in &submissions {
        match submission_grade(db, submission.id) {
            Ok(grade) => grades.push(grade),
            Err(DraftmarkError::NotFound { .. }) => {
                tracing::debug!(submission_id = submission.id, "no grade yet, skipping");
            }
            Err(e) => {
                tracing::warn!(
                    submission_id = submission.id,
                    error = %e,
                    "failed to load grade, skipping"
                );
            }
        }
    }

    Ok(grades)
}

/// Teacher override of one feedback row: replaces the score and attaches
/// teacher feedback while keeping the AI's original commentary intact.
pub fn review_feedback(
    db: &Database,
    feedback_id: i64,
    score: i64,
    teacher_feedback: &str,
) -> Result<Feedback> {
    let reviewed = db.review_feedback(feedback_id, score, teacher_feedback)?;
    tracing::info!(feedback_id, score, "teacher review recorded");
    Ok(reviewed)
}
