//! dbt-coverage: documentation and test coverage for dbt projects
//!
//! ## Usage
//!
//! ```bash
//! dbt-coverage compute doc --cov-report coverage-doc.json
//! dbt-coverage compute test --xml-report coverage-test.xml --cov-fail-under 0.8
//! dbt-coverage compare coverage-doc.json coverage-doc-main.json
//! ```

use clap::Parser;
use dbt_coverage_cli::{
    handlers::{execute_compare, execute_compute},
    init_logging, Cli, CliConfig, CliResult, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(config.verbosity);

    match &cli.command {
        Commands::Compute(args) => execute_compute(&config, args),
        Commands::Compare(args) => execute_compare(&config, args),
    }
}

/// Config file values with global flags applied on top
fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let mut config = CliConfig::discover(cli.config.as_deref())?;

    if cli.quiet {
        config = config.with_verbosity(Verbosity::Quiet);
    } else if cli.verbose > 0 {
        let verbosity = if cli.verbose == 1 {
            Verbosity::Verbose
        } else {
            Verbosity::Debug
        };
        config = config.with_verbosity(verbosity);
    }

    if let Some(color) = cli.color {
        config = config.with_color(color.into());
    }

    Ok(config)
}
