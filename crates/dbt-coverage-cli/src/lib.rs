//! dbt-coverage CLI Library
//!
//! Command-line interface for computing and comparing dbt coverage reports.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, CompareArgs, ComputeArgs, CovTypeArg, FormatArg};
pub use config::{validate_threshold, CliConfig, ColorChoice, Verbosity, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::ProgressReporter;
