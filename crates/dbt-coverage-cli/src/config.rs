//! CLI configuration
//!
//! Settings come from an optional YAML file (`.dbt-coverage.yml` by default) and are
//! overridden by command-line flags.
//!
//! ```yaml
//! cov_fail_under: 0.8
//! model_path_filter:
//!   - models/marts
//! include_tables: false
//! diff_policy:
//!   include_new_entities: true
//!   include_deleted_entities: false
//! ```

use crate::error::{CliError, CliResult};
use dbt_coverage::DiffPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = ".dbt-coverage.yml";

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default log filter directive when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_level(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Minimum coverage ratio for `compute`
    pub cov_fail_under: Option<f64>,
    /// Only tables whose path starts with one of these prefixes are measured
    pub model_path_filter: Vec<String>,
    /// Count tables as entities next to their columns
    pub include_tables: bool,
    /// What counts as a new miss when comparing snapshots
    pub diff_policy: DiffPolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            cov_fail_under: None,
            model_path_filter: Vec::new(),
            include_tables: false,
            diff_policy: DiffPolicy::default(),
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML config document
    pub fn from_yaml(yaml: &str) -> CliResult<Self> {
        let config: Self =
            serde_yaml_ng::from_str(yaml).map_err(|e| CliError::config(e.to_string()))?;
        if let Some(threshold) = config.cov_fail_under {
            validate_threshold(threshold).map_err(|_| {
                CliError::config(format!(
                    "cov_fail_under must be between 0 and 1, got {threshold}"
                ))
            })?;
        }
        Ok(config)
    }

    /// Load a YAML config file
    pub fn load(path: &Path) -> CliResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&yaml)
    }

    /// Load the explicit config file, or the default one when it exists, or defaults
    ///
    /// An explicit path that does not exist is an error; a missing default file is not.
    pub fn discover(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set the model path filter
    #[must_use]
    pub fn with_model_path_filter(mut self, prefixes: Vec<String>) -> Self {
        self.model_path_filter = prefixes;
        self
    }

    /// Count tables as entities
    #[must_use]
    pub const fn with_include_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }

    /// Set the diff policy
    #[must_use]
    pub const fn with_diff_policy(mut self, policy: DiffPolicy) -> Self {
        self.diff_policy = policy;
        self
    }
}

/// Check that a coverage threshold is a ratio in `[0, 1]`
pub fn validate_threshold(threshold: f64) -> CliResult<f64> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(CliError::invalid_argument(format!(
            "coverage threshold must be between 0 and 1, got {threshold}"
        )))
    }
}
