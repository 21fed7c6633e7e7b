//! SQLite database schema for draftmark

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = r#"
-- Students referenced by submissions (minimal collaborator record)
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

-- Assignments: only the fields the grading engine reads
CREATE TABLE IF NOT EXISTS assignments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    instructions TEXT,
    created_date TEXT NOT NULL
);

-- Reusable named sets of grading criteria
CREATE TABLE IF NOT EXISTS rubric_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_by TEXT,
    created_date TEXT NOT NULL
);

-- Criteria belong to exactly one template; insertion order is prompt order
CREATE TABLE IF NOT EXISTS rubric_criteria (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id INTEGER NOT NULL REFERENCES rubric_templates(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    max_score INTEGER NOT NULL CHECK (max_score > 0),
    UNIQUE (template_id, name)
);
CREATE INDEX IF NOT EXISTS idx_criteria_template ON rubric_criteria(template_id);

-- Optional calibration anchors for criteria
CREATE TABLE IF NOT EXISTS criteria_examples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    criterion_id INTEGER NOT NULL REFERENCES rubric_criteria(id) ON DELETE CASCADE,
    example_text TEXT NOT NULL,
    example_score INTEGER NOT NULL,
    example_feedback TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_examples_criterion ON criteria_examples(criterion_id);

-- A template bound to an assignment; at most one active per assignment
CREATE TABLE IF NOT EXISTS rubric_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assignment_id INTEGER NOT NULL REFERENCES assignments(id),
    template_id INTEGER NOT NULL REFERENCES rubric_templates(id),
    version_number INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 0,
    created_date TEXT NOT NULL,
    UNIQUE (assignment_id, version_number)
);
CREATE INDEX IF NOT EXISTS idx_versions_assignment ON rubric_versions(assignment_id);

-- Student drafts; grading status is an explicit column, not a draft count
CREATE TABLE IF NOT EXISTS submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assignment_id INTEGER NOT NULL REFERENCES assignments(id),
    student_id INTEGER NOT NULL REFERENCES students(id),
    draft_number INTEGER NOT NULL DEFAULT 1,
    content TEXT NOT NULL,
    submission_date TEXT NOT NULL,
    grading_state TEXT NOT NULL DEFAULT 'ungraded'
);
CREATE INDEX IF NOT EXISTS idx_submissions_assignment ON submissions(assignment_id);
CREATE INDEX IF NOT EXISTS idx_submissions_student ON submissions(student_id);

-- One row per (submission, criterion) per rubric version; a grading pass
-- replaces the whole set for its (submission, version) pair
CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id INTEGER NOT NULL REFERENCES submissions(id),
    criterion_id INTEGER NOT NULL REFERENCES rubric_criteria(id),
    rubric_version_id INTEGER NOT NULL REFERENCES rubric_versions(id),
    ai_feedback TEXT NOT NULL,
    teacher_feedback TEXT,
    score INTEGER NOT NULL,
    feedback_date TEXT NOT NULL,
    UNIQUE (submission_id, criterion_id, rubric_version_id)
);
CREATE INDEX IF NOT EXISTS idx_feedback_submission ON feedback(submission_id);
CREATE INDEX IF NOT EXISTS idx_feedback_version ON feedback(rubric_version_id);

-- Store metadata
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT
);
"#;

pub fn create_schema(conn: &Connection) -> Result<()> {
    let current_version: Option<i32> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = 'schema_version'",
            [],
            |r| r.get::<_, String>(0).map(|s| s.parse().unwrap_or(0)),
        )
        .ok();

    match current_version {
        None => {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.execute(
                "INSERT INTO store_meta (key, value) VALUES ('schema_version', ?1)",
                [&CURRENT_SCHEMA_VERSION.to_string()],
            )?;
        }
        Some(v) if v == CURRENT_SCHEMA_VERSION => {}
        Some(v) => {
            tracing::info!(
                "Database schema version {} behind current {}, re-running schema batch",
                v,
                CURRENT_SCHEMA_VERSION
            );
            conn.execute_batch(SCHEMA_SQL)?;
            conn.execute(
                "UPDATE store_meta SET value = ?1 WHERE key = 'schema_version'",
                [&CURRENT_SCHEMA_VERSION.to_string()],
            )?;
        }
    }

    Ok(())
}
