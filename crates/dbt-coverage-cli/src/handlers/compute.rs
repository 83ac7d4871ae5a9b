//! Compute command handler

use crate::config::{validate_threshold, CliConfig};
use crate::error::{CliError, CliResult};
use crate::handlers::compare::check_regression;
use crate::output::{print_report, ProgressReporter};
use crate::ComputeArgs;
use dbt_coverage::{
    load_catalog, render_diff, CoberturaFormatter, CoverageDiff, CoverageOptions, CoverageReport,
    CoverageType, TextFormatter,
};
use std::path::Path;

/// Execute the compute command
pub fn execute_compute(config: &CliConfig, args: &ComputeArgs) -> CliResult<()> {
    let cov_type = CoverageType::from(args.cov_type);
    let threshold = args
        .cov_fail_under
        .or(config.cov_fail_under)
        .map(validate_threshold)
        .transpose()?;
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let artifacts_dir = args.artifacts_dir();
    reporter.start_spinner(&format!(
        "Loading dbt artifacts from {}",
        artifacts_dir.display()
    ));
    let catalog = load_catalog(&artifacts_dir);
    reporter.finish_spinner();
    let catalog = catalog?;

    let filters = if args.model_path_filter.is_empty() {
        &config.model_path_filter
    } else {
        &args.model_path_filter
    };
    let catalog = catalog.filter_by_path(filters.as_slice());
    if catalog.is_empty() {
        reporter.warning("No tables to measure");
    }

    let options =
        CoverageOptions::new().with_include_tables(args.include_tables || config.include_tables);
    let report = CoverageReport::from_catalog_with(&catalog, cov_type, &options);
    tracing::info!(
        cov_type = %cov_type,
        tables = catalog.len(),
        covered = report.covered().len(),
        total = report.total().len(),
        "computed coverage"
    );

    print_report(
        &TextFormatter::new(&report)
            .with_format(args.cov_format.into())
            .generate(),
    )?;

    let report_path = args.report_path();
    report.save_json(&report_path)?;
    reporter.info(&format!("Coverage report saved to {}", report_path.display()));

    if let Some(xml_path) = &args.xml_report {
        CoberturaFormatter::new(&report, project_root(&args.project_dir)).save(xml_path)?;
        reporter.info(&format!("Cobertura report saved to {}", xml_path.display()));
    }

    if let Some(threshold) = threshold {
        check_threshold(&report, threshold, &reporter)?;
    }

    if let Some(baseline_path) = &args.cov_fail_compare {
        let baseline = CoverageReport::load_json(baseline_path)?;
        let diff = CoverageDiff::compute_with(&baseline, &report, config.diff_policy)?;
        print_report(&render_diff(&diff))?;
        check_regression(&diff, &reporter)?;
    }

    Ok(())
}

/// Fail when coverage is below `threshold`
///
/// Undefined coverage (nothing to measure) passes with a warning.
pub fn check_threshold(
    report: &CoverageReport,
    threshold: f64,
    reporter: &ProgressReporter,
) -> CliResult<()> {
    match report.coverage() {
        None => {
            reporter.warning("Coverage is undefined, skipping threshold check");
            Ok(())
        }
        Some(coverage) if coverage < threshold => {
            reporter.failure(&format!(
                "{} coverage {:.1}% is below {:.1}%",
                report.report_type(),
                coverage * 100.0,
                threshold * 100.0
            ));
            Err(CliError::below_threshold(coverage, threshold))
        }
        Some(coverage) => {
            reporter.success(&format!(
                "{} coverage {:.1}% meets {:.1}%",
                report.report_type(),
                coverage * 100.0,
                threshold * 100.0
            ));
            Ok(())
        }
    }
}

/// Absolute project directory used as the Cobertura source root
#[must_use]
pub fn project_root(project_dir: &Path) -> String {
    project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf())
        .display()
        .to_string()
}
