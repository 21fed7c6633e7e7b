//! Error types and exit codes for draftmark
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (upstream model errors, IO)
//! - 2: Usage error (bad flags/args, invalid values)
//! - 3: Data/store error (missing store, missing records, preconditions)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the draftmark CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data/store error - missing store, missing records (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<rusqlite::Error> for DraftmarkError {
    fn from(err: rusqlite::Error) -> Self {
        DraftmarkError::Other(err.to_string())
    }
}

/// Errors that can occur during draftmark operations
#[derive(Error, Debug)]
pub enum DraftmarkError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data/store errors (exit code 3)
    #[error("store not found (searched from {search_root:?})")]
    StoreNotFound { search_root: PathBuf },

    #[error("store already exists at {path:?}")]
    StoreAlreadyExists { path: PathBuf },

    #[error("invalid store: {reason}")]
    InvalidStore { reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("no active rubric version for assignment {assignment_id}")]
    NoActiveRubric { assignment_id: i64 },

    // Upstream model failures (exit code 1)
    #[error("model request failed: {reason}")]
    UpstreamFailure { reason: String },

    #[error("model request timed out after {seconds}s")]
    UpstreamTimeout { seconds: u64 },

    #[error("failed to parse model response: {reason}")]
    ParseFailure { reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl DraftmarkError {
    /// Create an error for a failed database operation
    pub fn db_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        DraftmarkError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed transaction operation
    pub fn transaction(operation: &str, error: impl std::fmt::Display) -> Self {
        DraftmarkError::FailedOperation {
            operation: format!("{} transaction", operation),
            reason: error.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        DraftmarkError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an invalid value
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        DraftmarkError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            // Usage errors
            DraftmarkError::UsageError(_) | DraftmarkError::InvalidValue { .. } => ExitCode::Usage,

            // Data/store errors
            DraftmarkError::StoreNotFound { .. }
            | DraftmarkError::StoreAlreadyExists { .. }
            | DraftmarkError::InvalidStore { .. }
            | DraftmarkError::NotFound { .. }
            | DraftmarkError::NoActiveRubric { .. } => ExitCode::Data,

            // Generic failures
            DraftmarkError::UpstreamFailure { .. }
            | DraftmarkError::UpstreamTimeout { .. }
            | DraftmarkError::ParseFailure { .. }
            | DraftmarkError::Io(_)
            | DraftmarkError::Json(_)
            | DraftmarkError::Toml(_)
            | DraftmarkError::FailedOperation { .. }
            | DraftmarkError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            DraftmarkError::UsageError(_) => "usage_error",
            DraftmarkError::InvalidValue { .. } => "invalid_value",
            DraftmarkError::StoreNotFound { .. } => "store_not_found",
            DraftmarkError::StoreAlreadyExists { .. } => "store_already_exists",
            DraftmarkError::InvalidStore { .. } => "invalid_store",
            DraftmarkError::NotFound { .. } => "not_found",
            DraftmarkError::NoActiveRubric { .. } => "no_active_rubric",
            DraftmarkError::UpstreamFailure { .. } => "upstream_failure",
            DraftmarkError::UpstreamTimeout { .. } => "upstream_timeout",
            DraftmarkError::ParseFailure { .. } => "parse_failure",
            DraftmarkError::Io(_) => "io_error",
            DraftmarkError::Json(_) => "json_error",
            DraftmarkError::Toml(_) => "toml_error",
            DraftmarkError::FailedOperation { .. } => "failed_operation",
            DraftmarkError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for draftmark operations
pub type Result<T> = std::result::Result<T, DraftmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_data_exit_code() {
        let err = DraftmarkError::not_found("submission", 42);
        assert_eq!(err.exit_code(), ExitCode::Data);
        assert_eq!(err.error_type(), "not_found");
        assert_eq!(err.to_string(), "submission not found: 42");
    }

    #[test]
    fn test_no_active_rubric_is_precondition_not_retryable() {
        let err = DraftmarkError::NoActiveRubric { assignment_id: 7 };
        assert_eq!(err.exit_code(), ExitCode::Data);
        assert_eq!(err.error_type(), "no_active_rubric");
    }

    #[test]
    fn test_upstream_variants_map_to_failure() {
        let timeout = DraftmarkError::UpstreamTimeout { seconds: 30 };
        let parse = DraftmarkError::ParseFailure {
            reason: "missing score line".to_string(),
        };
        assert_eq!(timeout.exit_code(), ExitCode::Failure);
        assert_eq!(parse.exit_code(), ExitCode::Failure);
        assert_ne!(timeout.error_type(), parse.error_type());
    }

    #[test]
    fn test_to_json_envelope() {
        let err = DraftmarkError::UsageError("bad flag".to_string());
        let json = err.to_json();
        assert_eq!(json["error"]["code"], 2);
        assert_eq!(json["error"]["type"], "usage_error");
        assert_eq!(json["error"]["message"], "bad flag");
    }
}
