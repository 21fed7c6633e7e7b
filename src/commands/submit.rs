//! `draftmark submit` command - record a student submission

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use draftmark_core::error::{DraftmarkError, Result};
use draftmark_core::store::Store;

pub fn execute(
    cli: &Cli,
    store: &Store,
    assignment_id: i64,
    student_id: i64,
    draft: Option<i64>,
    file: Option<&Path>,
) -> Result<()> {
    let content = read_content(file)?;
    if content.trim().is_empty() {
        return Err(DraftmarkError::UsageError(
            "submission content is empty".to_string(),
        ));
    }

    let draft_number = match draft {
        Some(n) if n > 0 => n,
        Some(n) => {
            return Err(DraftmarkError::invalid_value("draft number", n));
        }
        None => store
            .db()
            .latest_draft(assignment_id, student_id)?
            .map(|s| s.draft_number + 1)
            .unwrap_or(1),
    };

    let submission = store
        .db()
        .create_submission(assignment_id, student_id, draft_number, &content)?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!(
                    "Recorded submission {} (draft {} of student {} for assignment {})",
                    submission.id,
                    submission.draft_number,
                    submission.student_id,
                    submission.assignment_id
                );
            }
        }
    }

    Ok(())
}

fn read_content(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}
