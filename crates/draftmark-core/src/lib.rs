//! Draftmark Core Library
//!
//! Core domain logic for the Draftmark grading engine: rubric templates and
//! versions, student submissions, and AI-assisted grading with teacher review.

pub mod config;
pub mod db;
pub mod error;
pub mod grader;
pub mod llm;
pub mod logging;
pub mod model;
pub mod store;
