//! AI grading engine
//!
//! One grading attempt moves through `Pending -> Prompting -> Parsing ->
//! Persisting -> Complete`; a failure in Prompting or Parsing aborts the
//! attempt before anything is written, so a grading result is always a full
//! set of feedback rows or nothing.

mod grades;
mod parse;
pub mod prompt;

use std::fmt;

use crate::db::Database;
use crate::error::Result;
use crate::llm::CompletionClient;
use crate::model::SubmissionGrade;

pub use grades::{assignment_grades, review_feedback, submission_grade};
pub use prompt::build_grading_prompt;

use prompt::PromptCriterion;

/// Where a grading attempt currently is (or where it failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingPhase {
    Pending,
    Prompting,
    Parsing,
    Persisting,
    Complete,
    Failed,
}

impl fmt::Display for GradingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GradingPhase::Pending => "pending",
            GradingPhase::Prompting => "prompting",
            GradingPhase::Parsing => "parsing",
            GradingPhase::Persisting => "persisting",
            GradingPhase::Complete => "complete",
            GradingPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a best-effort batch regrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegradeReport {
    pub graded: usize,
    pub failed: usize,
}

/// The grading engine: loads the active rubric, prompts the model, parses
/// the response and persists the result. Both collaborators are injected.
pub struct Grader<'a> {
    db: &'a Database,
    client: &'a dyn CompletionClient,
}

impl<'a> Grader<'a> {
    pub fn new(db: &'a Database, client: &'a dyn CompletionClient) -> Self {
        Self { db, client }
    }

    /// Grade one submission against its assignment's active rubric version.
    /// Returns the aggregated grade for the fresh pass.
    pub fn grade_submission(&self, submission_id: i64) -> Result<SubmissionGrade> {
        let mut phase = GradingPhase::Pending;
        tracing::debug!(submission_id, phase = %phase, "grading attempt started");

        let result = self.grade_inner(submission_id, &mut phase);

        match &result {
            Ok(_) => {
                tracing::info!(submission_id, phase = %GradingPhase::Complete, "grading complete");
            }
            Err(e) => {
                tracing::error!(
                    submission_id,
                    failed_in = %phase,
                    error_type = e.error_type(),
                    error = %e,
                    "AI grading failed"
                );
            }
        }

        result
    }

    fn grade_inner(
        &self,
        submission_id: i64,
        phase: &mut GradingPhase,
    ) -> Result<SubmissionGrade> {
        let submission = self.db.find_submission(submission_id)?;
        let assignment = self.db.find_assignment(submission.assignment_id)?;

        // Missing active rubric is a precondition failure the caller must
        // fix by binding a version, not a transient error to retry
        let version = self
            .db
            .find_active_version(assignment.id)?
            .ok_or(crate::error::DraftmarkError::NoActiveRubric {
                assignment_id: assignment.id,
            })?;

        let criteria = self.db.criteria_for_template(version.template_id)?;
        if criteria.is_empty() {
            return Err(crate::error::DraftmarkError::InvalidStore {
                reason: format!(
                    "rubric template {} has no criteria to grade against",
                    version.template_id
                ),
            });
        }

        let mut prompt_criteria = Vec::with_capacity(criteria.len());
        for criterion in criteria {
            let examples = self.db.examples_for_criterion(criterion.id)?;
            prompt_criteria.push(PromptCriterion { criterion, examples });
        }

        *phase = GradingPhase::Prompting;
        let messages = build_grading_prompt(&assignment, &submission, &prompt_criteria);
        tracing::debug!(
            submission_id,
            messages = messages.len(),
            criteria = prompt_criteria.len(),
            "invoking model"
        );
        let response = self.client.complete(&messages)?;

        *phase = GradingPhase::Parsing;
        let plain_criteria: Vec<_> = prompt_criteria
            .into_iter()
            .map(|p| p.criterion)
            .collect();
        let graded = parse::parse_response(&response, &plain_criteria)?;

        *phase = GradingPhase::Persisting;
        self.db
            .replace_feedback_set(submission_id, version.id, &graded)?;

        *phase = GradingPhase::Complete;
        submission_grade(self.db, submission_id)
    }

    /// Re-run grading over every submission of an assignment. Per-submission
    /// failures are logged and counted; the batch continues.
    pub fn regrade_assignment(&self, assignment_id: i64) -> Result<RegradeReport> {
        self.db.find_assignment(assignment_id)?;
        let submissions = self.db.submissions_for_assignment(assignment_id)?;

        let mut report = RegradeReport { graded: 0, failed: 0 };
        for submission in &submissions {
            match self.grade_submission(submission.id) {
                Ok(_) => report.graded += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        submission_id = submission.id,
                        error = %e,
                        "regrade failed for submission, continuing batch"
                    );
                }
            }
        }

        tracing::info!(
            assignment_id,
            graded = report.graded,
            failed = report.failed,
            "regrade finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DraftmarkError;
    use crate::llm::Message;
    use crate::model::GradingState;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Test double returning scripted responses (or failures) in order
    struct ScriptedClient {
        responses: RefCell<VecDeque<std::result::Result<String, String>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<std::result::Result<&str, &str>>) -> Self {
            Self {
                responses: RefCell::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: RefCell::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl CompletionClient for ScriptedClient {
        fn complete(&self, _messages: &[Message]) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            match self.responses.borrow_mut().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(reason)) => Err(DraftmarkError::UpstreamFailure { reason }),
                None => Err(DraftmarkError::UpstreamFailure {
                    reason: "script exhausted".to_string(),
                }),
            }
        }
    }

    struct Fixture {
        db: Database,
        assignment_id: i64,
        student_id: i64,
    }

    /// Assignment with one active rubric version: Thesis (max 10) and
    /// Structure (max 5)
    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let assignment = db
            .create_assignment("Persuasive Essay", None, Some("Argue a position"))
            .unwrap();
        let template = db.create_template("Essay Rubric", None).unwrap();
        db.add_criterion(template.id, "Thesis", "clarity of claim", 10)
            .unwrap();
        db.add_criterion(template.id, "Structure", "paragraph flow", 5)
            .unwrap();
        db.create_new_version(assignment.id, template.id).unwrap();
        let student = db.create_student("Ada").unwrap();
        Fixture {
            db,
            assignment_id: assignment.id,
            student_id: student.id,
        }
    }

    const GOOD_RESPONSE: &str = "Criterion: Thesis\nScore: 8\nFeedback: Good thesis\n\n\
                                 Criterion: Structure\nScore: 4\nFeedback: Clear structure";

    #[test]
    fn test_grade_submission_scenario() {
        let f = fixture();
        let submission = f
            .db
            .create_submission(f.assignment_id, f.student_id, 1, "My essay")
            .unwrap();

        let client = ScriptedClient::new(vec![Ok(GOOD_RESPONSE)]);
        let grader = Grader::new(&f.db, &client);
        let grade = grader.grade_submission(submission.id).unwrap();

        assert_eq!(grade.total_score, 12);
        assert_eq!(grade.max_possible_score, 15);
        assert!((grade.percentage - 80.0).abs() < f64::EPSILON);
        assert_eq!(grade.feedback.len(), 2);

        // Round-trip through the aggregation entry point
        let reread = submission_grade(&f.db, submission.id).unwrap();
        assert_eq!(reread.total_score, 12);
        let thesis = reread
            .feedback
            .iter()
            .find(|d| d.criterion_name == "Thesis")
            .unwrap();
        assert_eq!(thesis.score, 8);
        assert_eq!(thesis.ai_feedback, "Good thesis");

        let reloaded = f.db.find_submission(submission.id).unwrap();
        assert_eq!(reloaded.grading_state, GradingState::Graded);
        assert_eq!(reloaded.draft_number, 1);
    }

    #[test]
    fn test_grade_submission_not_found() {
        let f = fixture();
        let client = ScriptedClient::new(vec![]);
        let grader = Grader::new(&f.db, &client);
        let err = grader.grade_submission(999).unwrap_err();
        assert!(matches!(err, DraftmarkError::NotFound { .. }));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_grade_requires_active_rubric() {
        let f = fixture();
        let bare = f.db.create_assignment("No rubric", None, None).unwrap();
        let submission = f
            .db
            .create_submission(bare.id, f.student_id, 1, "essay")
            .unwrap();

        let client = ScriptedClient::new(vec![Ok(GOOD_RESPONSE)]);
        let grader = Grader::new(&f.db, &client);
        let err = grader.grade_submission(submission.id).unwrap_err();
        assert!(matches!(err, DraftmarkError::NoActiveRubric { .. }));
        // Precondition failures never reach the model
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_partial_response_persists_nothing() {
        let f = fixture();
        let submission = f
            .db
            .create_submission(f.assignment_id, f.student_id, 1, "essay")
            .unwrap();

        // Only one block for a two-criterion rubric
        let client = ScriptedClient::new(vec![Ok(
            "Criterion: Thesis\nScore: 8\nFeedback: Good thesis",
        )]);
        let grader = Grader::new(&f.db, &client);
        let err = grader.grade_submission(submission.id).unwrap_err();
        assert!(matches!(err, DraftmarkError::ParseFailure { .. }));

        assert_eq!(f.db.get_feedback_count().unwrap(), 0);
        let reloaded = f.db.find_submission(submission.id).unwrap();
        assert_eq!(reloaded.grading_state, GradingState::Ungraded);
    }

    #[test]
    fn test_upstream_failure_persists_nothing() {
        let f = fixture();
        let submission = f
            .db
            .create_submission(f.assignment_id, f.student_id, 1, "essay")
            .unwrap();

        let client = ScriptedClient::new(vec![Err("connection reset")]);
        let grader = Grader::new(&f.db, &client);
        let err = grader.grade_submission(submission.id).unwrap_err();
        assert!(matches!(err, DraftmarkError::UpstreamFailure { .. }));
        assert_eq!(f.db.get_feedback_count().unwrap(), 0);
    }

    #[test]
    fn test_regrade_replaces_previous_pass() {
        let f = fixture();
        let submission = f
            .db
            .create_submission(f.assignment_id, f.student_id, 1, "essay")
            .unwrap();

        let client = ScriptedClient::new(vec![
            Ok(GOOD_RESPONSE),
            Ok("Criterion: Thesis\nScore: 9\nFeedback: Stronger now\n\n\
                Criterion: Structure\nScore: 5\nFeedback: Tight"),
        ]);
        let grader = Grader::new(&f.db, &client);

        grader.grade_submission(submission.id).unwrap();
        grader.grade_submission(submission.id).unwrap();

        // The fresh pass replaced the old rows rather than accumulating
        assert_eq!(f.db.get_feedback_count().unwrap(), 2);
        let grade = submission_grade(&f.db, submission.id).unwrap();
        assert_eq!(grade.total_score, 14);
    }

    #[test]
    fn test_regrade_assignment_best_effort() {
        let f = fixture();
        for content in ["essay one", "essay two", "essay three"] {
            f.db
                .create_submission(f.assignment_id, f.student_id, 1, content)
                .unwrap();
        }

        // Second submission's model call fails, others succeed
        let client = ScriptedClient::new(vec![
            Ok(GOOD_RESPONSE),
            Err("upstream exploded"),
            Ok(GOOD_RESPONSE),
        ]);
        let grader = Grader::new(&f.db, &client);

        let report = grader.regrade_assignment(f.assignment_id).unwrap();
        assert_eq!(report.graded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(client.call_count(), 3);

        let grades = assignment_grades(&f.db, f.assignment_id).unwrap();
        assert_eq!(grades.len(), 2);
    }

    #[test]
    fn test_review_after_grading_keeps_ai_feedback() {
        let f = fixture();
        let submission = f
            .db
            .create_submission(f.assignment_id, f.student_id, 1, "essay")
            .unwrap();

        let client = ScriptedClient::new(vec![Ok(GOOD_RESPONSE)]);
        let grader = Grader::new(&f.db, &client);
        let grade = grader.grade_submission(submission.id).unwrap();

        let thesis = grade
            .feedback
            .iter()
            .find(|d| d.criterion_name == "Thesis")
            .unwrap();
        let reviewed =
            review_feedback(&f.db, thesis.feedback_id, 9, "Actually excellent").unwrap();

        assert_eq!(reviewed.score, 9);
        assert_eq!(reviewed.teacher_feedback.as_deref(), Some("Actually excellent"));
        assert_eq!(reviewed.ai_feedback, "Good thesis");
    }

    #[test]
    fn test_submission_grade_without_feedback_is_not_found() {
        let f = fixture();
        let submission = f
            .db
            .create_submission(f.assignment_id, f.student_id, 1, "essay")
            .unwrap();
        let err = submission_grade(&f.db, submission.id).unwrap_err();
        assert!(matches!(err, DraftmarkError::NotFound { .. }));
    }

    #[test]
    fn test_assignment_grades_empty_when_nothing_graded() {
        let f = fixture();
        f.db
            .create_submission(f.assignment_id, f.student_id, 1, "essay")
            .unwrap();
        let grades = assignment_grades(&f.db, f.assignment_id).unwrap();
        assert!(grades.is_empty());
    }
}
