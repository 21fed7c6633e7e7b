//! Domain model for rubrics, submissions and feedback
//!
//! Rubric templates are reusable; binding a template to an assignment
//! happens through rubric versions, of which at most one is active per
//! assignment at any time. Feedback rows reference the version they were
//! graded under, so revising a rubric never rewrites grading history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A reusable named set of grading criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricTemplate {
    pub id: i64,
    pub name: String,
    pub created_by: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// A single scored dimension of a rubric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub id: i64,
    pub template_id: i64,
    pub name: String,
    pub description: String,
    /// Always positive; parsed scores are validated against this bound
    pub max_score: i64,
}

/// Anchor text used to calibrate the model's scoring for one criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionExample {
    pub id: i64,
    pub criterion_id: i64,
    pub example_text: String,
    pub example_score: i64,
    pub example_feedback: String,
}

/// A rubric template bound to an assignment at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricVersion {
    pub id: i64,
    pub assignment_id: i64,
    pub template_id: i64,
    /// Monotonically increasing per assignment, starting at 1
    pub version_number: i64,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
}

/// Whether a submission has a completed grading pass behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingState {
    Ungraded,
    Graded,
}

impl fmt::Display for GradingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingState::Ungraded => write!(f, "ungraded"),
            GradingState::Graded => write!(f, "graded"),
        }
    }
}

impl FromStr for GradingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ungraded" => Ok(GradingState::Ungraded),
            "graded" => Ok(GradingState::Graded),
            other => Err(format!("unknown grading state: {}", other)),
        }
    }
}

/// One submitted draft of a student's work for an assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSubmission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub draft_number: i64,
    pub content: String,
    pub submission_date: DateTime<Utc>,
    pub grading_state: GradingState,
}

/// AI score and commentary for one (submission, criterion) pair under a
/// specific rubric version. `teacher_feedback` is set only on review;
/// `ai_feedback` is never overwritten once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub submission_id: i64,
    pub criterion_id: i64,
    pub rubric_version_id: i64,
    pub ai_feedback: String,
    pub teacher_feedback: Option<String>,
    pub score: i64,
    pub feedback_date: DateTime<Utc>,
}

/// Assignment fields the grading engine reads; everything else about
/// assignments is owned by other tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// Minimal student record referenced by submissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
}

/// One feedback row joined with its criterion, for grade reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDetail {
    pub feedback_id: i64,
    pub criterion_id: i64,
    pub criterion_name: String,
    pub max_score: i64,
    pub score: i64,
    pub ai_feedback: String,
    pub teacher_feedback: Option<String>,
    pub feedback_date: DateTime<Utc>,
}

/// Aggregated grade for one submission's most recent grading pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionGrade {
    pub submission_id: i64,
    pub rubric_version_id: i64,
    pub feedback: Vec<FeedbackDetail>,
    pub total_score: i64,
    pub max_possible_score: i64,
    pub percentage: f64,
}
