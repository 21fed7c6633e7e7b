//! `draftmark grade` commands - run the grading engine and inspect results

use draftmark_core::grader::{self, Grader};
use draftmark_core::llm::AnthropicClient;
use draftmark_core::model::SubmissionGrade;

use crate::cli::{Cli, GradeCommands, OutputFormat};
use draftmark_core::error::Result;
use draftmark_core::store::Store;

pub fn execute(cli: &Cli, store: &Store, command: &GradeCommands) -> Result<()> {
    match command {
        GradeCommands::Run { submission_id } => {
            let client = AnthropicClient::new(store.config().llm_config())?;
            let grader = Grader::new(store.db(), &client);
            let grade = grader.grade_submission(*submission_id)?;
            print_grade(cli, &grade)
        }

        GradeCommands::Show { submission_id } => {
            let grade = grader::submission_grade(store.db(), *submission_id)?;
            print_grade(cli, &grade)
        }

        GradeCommands::Assignment { assignment_id } => {
            let grades = grader::assignment_grades(store.db(), *assignment_id)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&grades)?);
                }
                OutputFormat::Human => {
                    if grades.is_empty() {
                        println!("No graded submissions for assignment {}.", assignment_id);
                    }
                    for grade in &grades {
                        println!(
                            "submission {}: {}/{} ({:.1}%)",
                            grade.submission_id,
                            grade.total_score,
                            grade.max_possible_score,
                            grade.percentage
                        );
                    }
                }
            }
            Ok(())
        }

        GradeCommands::Review {
            feedback_id,
            score,
            feedback,
        } => {
            let reviewed = grader::review_feedback(store.db(), *feedback_id, *score, feedback)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&reviewed)?);
                }
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!(
                            "Reviewed feedback {} (score now {})",
                            reviewed.id, reviewed.score
                        );
                    }
                }
            }
            Ok(())
        }

        GradeCommands::Regrade { assignment_id } => {
            let client = AnthropicClient::new(store.config().llm_config())?;
            let grader = Grader::new(store.db(), &client);
            let report = grader.regrade_assignment(*assignment_id)?;

            match cli.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "assignment_id": assignment_id,
                        "graded": report.graded,
                        "failed": report.failed,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Human => {
                    println!(
                        "Regraded assignment {}: {} graded, {} failed",
                        assignment_id, report.graded, report.failed
                    );
                }
            }
            Ok(())
        }
    }
}

fn print_grade(cli: &Cli, grade: &SubmissionGrade) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(grade)?);
        }
        OutputFormat::Human => {
            println!(
                "Submission {} (rubric version {}): {}/{} ({:.1}%)",
                grade.submission_id,
                grade.rubric_version_id,
                grade.total_score,
                grade.max_possible_score,
                grade.percentage
            );
            for detail in &grade.feedback {
                let reviewed = if detail.teacher_feedback.is_some() {
                    " [reviewed]"
                } else {
                    ""
                };
                println!(
                    "  {}: {}/{}{}",
                    detail.criterion_name, detail.score, detail.max_score, reviewed
                );
                println!("    {}", detail.ai_feedback);
                if let Some(teacher) = &detail.teacher_feedback {
                    println!("    teacher: {}", teacher);
                }
            }
        }
    }
    Ok(())
}
