//! # Error Types
//!
//! Structured error types for pursuit_core. The calculation pipeline itself is
//! total and never returns these; they belong to the layers around it:
//! input validation, one-pager lookup, sensitivity step checks, and file I/O.
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::errors::{CalcError, CalcResult};
//!
//! fn validate_vacancy(vacancy_rate: f64) -> CalcResult<()> {
//!     if !(0.0..=1.0).contains(&vacancy_rate) {
//!         return Err(CalcError::InvalidInput {
//!             field: "vacancy_rate".to_string(),
//!             value: vacancy_rate.to_string(),
//!             reason: "Vacancy rate must be between 0 and 1".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pursuit_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for everything surrounding the calculation engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A one-pager (or other keyed record) does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    /// A sensitivity step array has no exact zero entry
    #[error("Sensitivity steps '{axis}' have no base case (no 0 entry in {steps:?})")]
    MissingBaseCase { axis: String, steps: Vec<f64> },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a MissingBaseCase error
    pub fn missing_base_case(axis: impl Into<String>, steps: &[f64]) -> Self {
        CalcError::MissingBaseCase {
            axis: axis.into(),
            steps: steps.to_vec(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::MissingBaseCase { .. } => "MISSING_BASE_CASE",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error =
            CalcError::invalid_input("vacancy_rate", "1.5", "Vacancy rate must be between 0 and 1");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::not_found("OnePager", "Base").error_code(), "NOT_FOUND");
        assert_eq!(
            CalcError::missing_base_case("rent", &[-0.1, 0.1]).error_code(),
            "MISSING_BASE_CASE"
        );
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(CalcError::file_locked("a.pursuit", "someone", "now").is_recoverable());
        assert!(!CalcError::file_error("open", "a.pursuit", "denied").is_recoverable());
    }

    #[test]
    fn test_missing_base_case_message() {
        let error = CalcError::missing_base_case("hard_cost", &[-10.0, 10.0]);
        assert_eq!(
            error.to_string(),
            "Sensitivity steps 'hard_cost' have no base case (no 0 entry in [-10.0, 10.0])"
        );
    }
}
