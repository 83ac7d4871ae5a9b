//! Compare command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{print_report, ProgressReporter};
use crate::CompareArgs;
use dbt_coverage::{render_diff, CoverageDiff, CoverageReport, DiffPolicy};

/// Execute the compare command
pub fn execute_compare(config: &CliConfig, args: &CompareArgs) -> CliResult<()> {
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let after = CoverageReport::load_json(&args.report)?;
    let before = CoverageReport::load_json(&args.compare_report)?;
    let policy = diff_policy(config, args);

    let diff = CoverageDiff::compute_with(&before, &after, policy)?;
    print_report(&render_diff(&diff))?;

    check_regression(&diff, &reporter)
}

/// Config-file policy with `--include-deleted` / `--no-new-entities` applied on top
#[must_use]
pub fn diff_policy(config: &CliConfig, args: &CompareArgs) -> DiffPolicy {
    let mut policy = config.diff_policy;
    if args.include_deleted {
        policy = policy.with_deleted_entities(true);
    }
    if args.no_new_entities {
        policy = policy.with_new_entities(false);
    }
    policy
}

/// Fail when the diff holds new misses or the coverage ratio dropped
pub fn check_regression(diff: &CoverageDiff, reporter: &ProgressReporter) -> CliResult<()> {
    if !diff.is_regression() {
        reporter.success(&format!("No {} coverage regression", diff.report_type()));
        return Ok(());
    }

    let message = if diff.new_misses().is_empty() {
        format!(
            "{} coverage dropped by {:.1}%",
            diff.report_type(),
            -diff.coverage_delta().unwrap_or_default() * 100.0
        )
    } else {
        format!("{} new miss(es)", diff.new_misses().len())
    };
    reporter.failure(&message);
    Err(CliError::regression(message))
}
