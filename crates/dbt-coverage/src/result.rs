//! Result and error types for dbt-coverage.

use crate::coverage::CoverageType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for dbt-coverage operations
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Errors that can occur while computing, comparing or loading coverage
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Two reports of different coverage types were compared
    #[error("Cannot compare {before} coverage with {after} coverage")]
    TypeMismatch {
        /// Coverage type of the baseline report
        before: CoverageType,
        /// Coverage type of the current report
        after: CoverageType,
    },

    /// A serialized report violates the report invariants
    #[error("Invalid coverage report: {message}")]
    InvalidReport {
        /// Error message
        message: String,
    },

    /// A dbt run artifact is missing or structurally unusable
    #[error("Artifact error in {}: {message}", path.display())]
    Artifact {
        /// Artifact path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoverageError {
    /// Create an invalid report error
    #[must_use]
    pub fn invalid_report(message: impl Into<String>) -> Self {
        Self::InvalidReport {
            message: message.into(),
        }
    }

    /// Create an artifact error
    #[must_use]
    pub fn artifact(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = CoverageError::TypeMismatch {
            before: CoverageType::Doc,
            after: CoverageType::Test,
        };
        assert_eq!(err.to_string(), "Cannot compare doc coverage with test coverage");
    }

    #[test]
    fn test_invalid_report_message() {
        let err = CoverageError::invalid_report("covered is not a subset of total");
        assert!(err.to_string().contains("Invalid coverage report"));
        assert!(err.to_string().contains("subset"));
    }

    #[test]
    fn test_artifact_message_names_path() {
        let err = CoverageError::artifact("target/manifest.json", "file not found");
        let msg = err.to_string();
        assert!(msg.contains("target/manifest.json"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoverageError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoverageError = json_err.into();
        assert!(err.to_string().contains("JSON"));
    }
}
