//! Assignment and student records
//!
//! Assignments and students are owned by surrounding tooling; the grading
//! engine only needs lookups plus the fields it reads at prompt time.

use crate::error::{DraftmarkError, Result};
use crate::model::{Assignment, Student};
use chrono::{DateTime, Utc};
use rusqlite::params;

pub(super) fn parse_datetime(s: String, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl super::Database {
    pub fn create_assignment(
        &self,
        title: &str,
        description: Option<&str>,
        instructions: Option<&str>,
    ) -> Result<Assignment> {
        let created_date = Utc::now();
        self.conn
            .execute(
                "INSERT INTO assignments (title, description, instructions, created_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![title, description, instructions, created_date.to_rfc3339()],
            )
            .map_err(|e| DraftmarkError::db_operation("insert assignment", e))?;

        Ok(Assignment {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            description: description.map(str::to_string),
            instructions: instructions.map(str::to_string),
            created_date,
        })
    }

    pub fn find_assignment(&self, id: i64) -> Result<Assignment> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, description, instructions, created_date
                 FROM assignments WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Assignment {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        instructions: row.get(3)?,
                        created_date: parse_datetime(row.get(4)?, 4)?,
                    })
                },
            );

        match row {
            Ok(assignment) => Ok(assignment),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("assignment", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query assignment", e)),
        }
    }

    pub fn create_student(&self, name: &str) -> Result<Student> {
        self.conn
            .execute("INSERT INTO students (name) VALUES (?1)", params![name])
            .map_err(|e| DraftmarkError::db_operation("insert student", e))?;

        Ok(Student {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn find_student(&self, id: i64) -> Result<Student> {
        let row = self.conn.query_row(
            "SELECT id, name FROM students WHERE id = ?1",
            params![id],
            |row| {
                Ok(Student {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        );

        match row {
            Ok(student) => Ok(student),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("student", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query student", e)),
        }
    }
}
