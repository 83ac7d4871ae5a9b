//! CLI command definitions using clap

use crate::config::ColorChoice;
use clap::{Parser, Subcommand, ValueEnum};
use dbt_coverage::{CoverageType, TextFormat};
use std::path::PathBuf;

/// dbt-coverage: documentation and test coverage for dbt projects
#[derive(Parser, Debug)]
#[command(name = "dbt-coverage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, global = true)]
    pub color: Option<ColorArg>,

    /// YAML config file (defaults to .dbt-coverage.yml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute coverage from dbt run artifacts
    Compute(ComputeArgs),

    /// Compare two coverage snapshots
    Compare(CompareArgs),
}

/// Arguments for the compute command
#[derive(Parser, Debug)]
pub struct ComputeArgs {
    /// Coverage type to compute
    #[arg(value_enum)]
    pub cov_type: CovTypeArg,

    /// dbt project directory
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Directory holding catalog.json and manifest.json (defaults to <project-dir>/target)
    #[arg(long)]
    pub run_artifacts_dir: Option<PathBuf>,

    /// JSON snapshot output path (defaults to coverage-<type>.json)
    #[arg(long)]
    pub cov_report: Option<PathBuf>,

    /// Layout of the printed report
    #[arg(long, value_enum, default_value = "string")]
    pub cov_format: FormatArg,

    /// Fail when coverage is below this ratio (0-1)
    #[arg(long)]
    pub cov_fail_under: Option<f64>,

    /// Fail when coverage regressed against this snapshot
    #[arg(long)]
    pub cov_fail_compare: Option<PathBuf>,

    /// Only measure tables whose path starts with this prefix (repeatable)
    #[arg(long = "model-path-filter")]
    pub model_path_filter: Vec<String>,

    /// Count tables as entities next to their columns
    #[arg(long)]
    pub include_tables: bool,

    /// Cobertura XML output path
    #[arg(long)]
    pub xml_report: Option<PathBuf>,
}

impl ComputeArgs {
    /// Run artifacts directory, defaulting to `<project-dir>/target`
    #[must_use]
    pub fn artifacts_dir(&self) -> PathBuf {
        self.run_artifacts_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join("target"))
    }

    /// Snapshot output path, defaulting to `coverage-<type>.json`
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.cov_report.clone().unwrap_or_else(|| {
            PathBuf::from(format!("coverage-{}.json", CoverageType::from(self.cov_type)))
        })
    }
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Current coverage snapshot
    pub report: PathBuf,

    /// Baseline coverage snapshot
    pub compare_report: PathBuf,

    /// Count covered entities that no longer exist as misses
    #[arg(long)]
    pub include_deleted: bool,

    /// Do not count new uncovered entities as misses
    #[arg(long)]
    pub no_new_entities: bool,
}

/// Coverage type argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CovTypeArg {
    /// Documentation coverage
    Doc,
    /// Test coverage
    Test,
}

impl From<CovTypeArg> for CoverageType {
    fn from(arg: CovTypeArg) -> Self {
        match arg {
            CovTypeArg::Doc => Self::Doc,
            CovTypeArg::Test => Self::Test,
        }
    }
}

/// Printed report layout
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Aligned text
    #[default]
    String,
    /// Markdown table
    Markdown,
}

impl From<FormatArg> for TextFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::String => Self::String,
            FormatArg::Markdown => Self::Markdown,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
