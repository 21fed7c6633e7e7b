//! Model response parsing
//!
//! Responses are chunked at `Criterion:` line starts and keyed by the echoed
//! criterion name, so block order does not matter. Every criterion must
//! appear exactly once with an integer score inside its range; any shortfall
//! fails the whole attempt rather than grading a subset or inventing a
//! number.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::db::GradedCriterion;
use crate::error::{DraftmarkError, Result};
use crate::model::RubricCriterion;

fn criterion_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*Criterion:\s*(.+?)\s*$").unwrap())
}

fn score_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*Score:\s*\[?(-?\d+)\]?\s*$").unwrap())
}

fn parse_failure(reason: impl Into<String>) -> DraftmarkError {
    DraftmarkError::ParseFailure {
        reason: reason.into(),
    }
}

/// Parse the assistant response into one scored entry per criterion,
/// returned in the criteria's prompt order.
pub fn parse_response(response: &str, criteria: &[RubricCriterion]) -> Result<Vec<GradedCriterion>> {
    let sections = split_sections(response);

    let by_name: HashMap<&str, &RubricCriterion> =
        criteria.iter().map(|c| (c.name.as_str(), c)).collect();

    let mut parsed: HashMap<i64, GradedCriterion> = HashMap::new();
    for (name, body) in &sections {
        let criterion = by_name.get(name.as_str()).ok_or_else(|| {
            parse_failure(format!("response names unknown criterion \"{}\"", name))
        })?;

        let (score, feedback) = parse_section(name, body, criterion.max_score)?;

        let entry = GradedCriterion {
            criterion_id: criterion.id,
            score,
            feedback,
        };
        if parsed.insert(criterion.id, entry).is_some() {
            return Err(parse_failure(format!(
                "criterion \"{}\" appears more than once in response",
                name
            )));
        }
    }

    let missing: Vec<&str> = criteria
        .iter()
        .filter(|c| !parsed.contains_key(&c.id))
        .map(|c| c.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(parse_failure(format!(
            "response missing {} of {} criteria: {}",
            missing.len(),
            criteria.len(),
            missing.join(", ")
        )));
    }

    Ok(criteria
        .iter()
        .map(|c| parsed.remove(&c.id).expect("coverage checked above"))
        .collect())
}

/// Chunk the response at `Criterion:` line starts. Prose before the first
/// tagged section (model preamble) is ignored.
fn split_sections(response: &str) -> Vec<(String, Vec<String>)> {
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();

    for line in response.lines() {
        if let Some(caps) = criterion_line().captures(line) {
            sections.push((caps[1].to_string(), Vec::new()));
        } else if let Some((_, body)) = sections.last_mut() {
            body.push(line.to_string());
        }
    }

    sections
}

fn parse_section(name: &str, body: &[String], max_score: i64) -> Result<(i64, String)> {
    let score_idx = body
        .iter()
        .position(|line| score_line().is_match(line))
        .ok_or_else(|| {
            parse_failure(format!("no score line for criterion \"{}\"", name))
        })?;

    let caps = score_line()
        .captures(&body[score_idx])
        .expect("position matched above");
    let score: i64 = caps[1].parse().map_err(|_| {
        parse_failure(format!("unparseable score for criterion \"{}\"", name))
    })?;

    if score < 0 || score > max_score {
        return Err(parse_failure(format!(
            "score {} for criterion \"{}\" outside 0..={}",
            score, name, max_score
        )));
    }

    let raw = body[score_idx + 1..].join("\n");
    let trimmed = raw.trim();
    // Strip the label once only, so feedback that itself begins with
    // "Feedback:" survives intact
    let feedback = trimmed
        .strip_prefix("Feedback:")
        .unwrap_or(trimmed)
        .trim()
        .to_string();

    Ok((score, feedback))
}
