//! Plain-text and markdown renderings of reports and diffs

use crate::coverage::{CoverageDiff, CoverageReport, EntityType};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Layout of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Aligned columns for terminals
    #[default]
    String,
    /// GitHub-flavoured markdown table
    Markdown,
}

/// Per-table coverage listing
#[derive(Debug)]
pub struct TextFormatter<'a> {
    report: &'a CoverageReport,
    format: TextFormat,
}

impl<'a> TextFormatter<'a> {
    /// Create a new formatter using the string layout
    #[must_use]
    pub fn new(report: &'a CoverageReport) -> Self {
        Self {
            report,
            format: TextFormat::default(),
        }
    }

    /// Set the layout
    #[must_use]
    pub const fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    /// Render the report
    #[must_use]
    pub fn generate(&self) -> String {
        let rows = self.rows();
        match self.format {
            TextFormat::String => self.render_string(&rows),
            TextFormat::Markdown => self.render_markdown(&rows),
        }
    }

    /// (name, covered/total, percent) per table, in table id order
    fn rows(&self) -> Vec<(String, String, String)> {
        let tables: Vec<&CoverageReport> = match self.report.entity_type() {
            EntityType::Catalog => self.report.subentities().values().collect(),
            EntityType::Table | EntityType::Column => vec![self.report],
        };
        tables
            .into_iter()
            .map(|table| (table.name().to_string(), fraction(table), percent(table)))
            .collect()
    }

    fn render_string(&self, rows: &[(String, String, String)]) -> String {
        let name_width = rows
            .iter()
            .map(|(name, _, _)| name.len())
            .chain(std::iter::once("Total".len()))
            .max()
            .unwrap_or(0);
        let rule = "=".repeat(name_width + 24);

        let mut out = String::new();
        let _ = writeln!(out, "Coverage report ({})", self.report.report_type());
        let _ = writeln!(out, "{rule}");
        for (name, fraction, percent) in rows {
            let _ = writeln!(out, "{name:<name_width$}  {fraction:>12}  {percent:>8}");
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>12}  {:>8}",
            "Total",
            fraction(self.report),
            percent(self.report)
        );
        out
    }

    fn render_markdown(&self, rows: &[(String, String, String)]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Coverage report ({})", self.report.report_type());
        out.push('\n');
        out.push_str("| Model | Covered | % |\n");
        out.push_str("|:------|--------:|:-:|\n");
        for (name, fraction, percent) in rows {
            let _ = writeln!(out, "| {name} | {fraction} | {percent} |");
        }
        let _ = writeln!(
            out,
            "| **Total** | {} | {} |",
            fraction(self.report),
            percent(self.report)
        );
        out
    }
}

fn fraction(report: &CoverageReport) -> String {
    format!("{}/{}", report.covered().len(), report.total().len())
}

fn percent(report: &CoverageReport) -> String {
    report
        .coverage_percent()
        .map_or_else(|| "-".to_string(), |pct| format!("{pct:.1}%"))
}

/// Render a comparison between two snapshots
#[must_use]
pub fn render_diff(diff: &CoverageDiff) -> String {
    let format_ratio = |ratio: Option<f64>| {
        ratio.map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r * 100.0))
    };

    let mut out = String::new();
    let _ = writeln!(out, "Coverage comparison ({})", diff.report_type());
    let _ = writeln!(out, "  Before: {}", format_ratio(diff.before_coverage()));
    let _ = writeln!(out, "  After:  {}", format_ratio(diff.after_coverage()));
    if let Some(delta) = diff.coverage_delta() {
        let _ = writeln!(out, "  Change: {:+.1}%", delta * 100.0);
    }

    if diff.new_misses().is_empty() {
        out.push_str("\nNo new misses.\n");
        return out;
    }

    let _ = writeln!(out, "\nNew misses ({}):", diff.new_misses().len());
    for (table_id, entities) in diff.new_misses_by_table() {
        let _ = writeln!(out, "  {table_id}");
        for entity in entities {
            let label = entity.column_name().unwrap_or("(table)");
            let _ = writeln!(out, "    - {label}");
        }
    }
    out
}
