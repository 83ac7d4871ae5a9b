//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Coverage fell below `--cov-fail-under`
    #[error("Coverage {actual:.1}% is below the required {required:.1}%")]
    BelowThreshold {
        /// Measured coverage in percent
        actual: f64,
        /// Required coverage in percent
        required: f64,
    },

    /// Comparison against a baseline found new misses or a lower ratio
    #[error("Coverage regressed: {message}")]
    Regression {
        /// What regressed
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// dbt-coverage library error
    #[error(transparent)]
    Coverage(#[from] dbt_coverage::CoverageError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a threshold error from coverage ratios
    #[must_use]
    pub fn below_threshold(actual: f64, required: f64) -> Self {
        Self::BelowThreshold {
            actual: actual * 100.0,
            required: required * 100.0,
        }
    }

    /// Create a regression error
    #[must_use]
    pub fn regression(message: impl Into<String>) -> Self {
        Self::Regression {
            message: message.into(),
        }
    }
}
