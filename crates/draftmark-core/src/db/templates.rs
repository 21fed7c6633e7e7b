//! Rubric template, criteria and calibration example repositories

use super::assignments::parse_datetime;
use crate::error::{DraftmarkError, Result};
use crate::model::{CriterionExample, RubricCriterion, RubricTemplate};
use chrono::Utc;
use rusqlite::params;

impl super::Database {
    pub fn create_template(&self, name: &str, created_by: Option<&str>) -> Result<RubricTemplate> {
        let created_date = Utc::now();
        self.conn
            .execute(
                "INSERT INTO rubric_templates (name, created_by, created_date) VALUES (?1, ?2, ?3)",
                params![name, created_by, created_date.to_rfc3339()],
            )
            .map_err(|e| DraftmarkError::db_operation("insert rubric template", e))?;

        Ok(RubricTemplate {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            created_by: created_by.map(str::to_string),
            created_date,
        })
    }

    pub fn find_template(&self, id: i64) -> Result<RubricTemplate> {
        let row = self.conn.query_row(
            "SELECT id, name, created_by, created_date FROM rubric_templates WHERE id = ?1",
            params![id],
            |row| {
                Ok(RubricTemplate {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_by: row.get(2)?,
                    created_date: parse_datetime(row.get(3)?, 3)?,
                })
            },
        );

        match row {
            Ok(template) => Ok(template),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("rubric template", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query rubric template", e)),
        }
    }

    pub fn list_templates(&self) -> Result<Vec<RubricTemplate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_by, created_date FROM rubric_templates ORDER BY id")
            .map_err(|e| DraftmarkError::db_operation("prepare template list", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RubricTemplate {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_by: row.get(2)?,
                    created_date: parse_datetime(row.get(3)?, 3)?,
                })
            })
            .map_err(|e| DraftmarkError::db_operation("list rubric templates", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read rubric template rows", e))
    }

    pub fn delete_template(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM rubric_templates WHERE id = ?1", params![id])
            .map_err(|e| DraftmarkError::db_operation("delete rubric template", e))?;

        if affected == 0 {
            return Err(DraftmarkError::not_found("rubric template", id));
        }
        Ok(())
    }

    /// Add a criterion to a template. Names must be unique within a template
    /// because the response parser keys blocks by criterion name.
    pub fn add_criterion(
        &self,
        template_id: i64,
        name: &str,
        description: &str,
        max_score: i64,
    ) -> Result<RubricCriterion> {
        if max_score <= 0 {
            return Err(DraftmarkError::invalid_value("max score", max_score));
        }
        self.find_template(template_id)?;

        self.conn
            .execute(
                "INSERT INTO rubric_criteria (template_id, name, description, max_score)
                 VALUES (?1, ?2, ?3, ?4)",
                params![template_id, name, description, max_score],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DraftmarkError::invalid_value("duplicate criterion name", name)
                }
                e => DraftmarkError::db_operation("insert rubric criterion", e),
            })?;

        Ok(RubricCriterion {
            id: self.conn.last_insert_rowid(),
            template_id,
            name: name.to_string(),
            description: description.to_string(),
            max_score,
        })
    }

    pub fn find_criterion(&self, id: i64) -> Result<RubricCriterion> {
        let row = self.conn.query_row(
            "SELECT id, template_id, name, description, max_score
             FROM rubric_criteria WHERE id = ?1",
            params![id],
            |row| {
                Ok(RubricCriterion {
                    id: row.get(0)?,
                    template_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    max_score: row.get(4)?,
                })
            },
        );

        match row {
            Ok(criterion) => Ok(criterion),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DraftmarkError::not_found("rubric criterion", id))
            }
            Err(e) => Err(DraftmarkError::db_operation("query rubric criterion", e)),
        }
    }

    /// Criteria in insertion order. The prompt enumerates criteria in this
    /// order and the parser checks exact-once coverage against it.
    pub fn criteria_for_template(&self, template_id: i64) -> Result<Vec<RubricCriterion>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, template_id, name, description, max_score
                 FROM rubric_criteria WHERE template_id = ?1 ORDER BY id",
            )
            .map_err(|e| DraftmarkError::db_operation("prepare criteria query", e))?;

        let rows = stmt
            .query_map(params![template_id], |row| {
                Ok(RubricCriterion {
                    id: row.get(0)?,
                    template_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    max_score: row.get(4)?,
                })
            })
            .map_err(|e| DraftmarkError::db_operation("query criteria", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read criterion rows", e))
    }

    /// Attach a calibration example to a criterion. Example scores must fall
    /// within the criterion's score range.
    pub fn add_example(
        &self,
        criterion_id: i64,
        example_text: &str,
        example_score: i64,
        example_feedback: &str,
    ) -> Result<CriterionExample> {
        let criterion = self.find_criterion(criterion_id)?;
        if example_score < 0 || example_score > criterion.max_score {
            return Err(DraftmarkError::invalid_value(
                "example score",
                format!("{} (expected 0..={})", example_score, criterion.max_score),
            ));
        }

        self.conn
            .execute(
                "INSERT INTO criteria_examples (criterion_id, example_text, example_score, example_feedback)
                 VALUES (?1, ?2, ?3, ?4)",
                params![criterion_id, example_text, example_score, example_feedback],
            )
            .map_err(|e| DraftmarkError::db_operation("insert criterion example", e))?;

        Ok(CriterionExample {
            id: self.conn.last_insert_rowid(),
            criterion_id,
            example_text: example_text.to_string(),
            example_score,
            example_feedback: example_feedback.to_string(),
        })
    }

    pub fn examples_for_criterion(&self, criterion_id: i64) -> Result<Vec<CriterionExample>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, criterion_id, example_text, example_score, example_feedback
                 FROM criteria_examples WHERE criterion_id = ?1 ORDER BY id",
            )
            .map_err(|e| DraftmarkError::db_operation("prepare example query", e))?;

        let rows = stmt
            .query_map(params![criterion_id], |row| {
                Ok(CriterionExample {
                    id: row.get(0)?,
                    criterion_id: row.get(1)?,
                    example_text: row.get(2)?,
                    example_score: row.get(3)?,
                    example_feedback: row.get(4)?,
                })
            })
            .map_err(|e| DraftmarkError::db_operation("query criterion examples", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DraftmarkError::db_operation("read example rows", e))
    }
}
