//! Coverage comparison between two report snapshots

use super::{CoverageReport, CoverageType, EntityRef};
use crate::result::{CoverageError, CoverageResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which entities count as new misses besides covered → uncovered regressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPolicy {
    /// Uncovered entities that did not exist in the baseline
    #[serde(default = "default_true")]
    pub include_new_entities: bool,
    /// Covered baseline entities that no longer exist
    #[serde(default)]
    pub include_deleted_entities: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for DiffPolicy {
    fn default() -> Self {
        Self {
            include_new_entities: true,
            include_deleted_entities: false,
        }
    }
}

impl DiffPolicy {
    /// Create the default policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count new uncovered entities as misses
    #[must_use]
    pub const fn with_new_entities(mut self, include: bool) -> Self {
        self.include_new_entities = include;
        self
    }

    /// Count deleted covered entities as misses
    #[must_use]
    pub const fn with_deleted_entities(mut self, include: bool) -> Self {
        self.include_deleted_entities = include;
        self
    }
}

/// Entities whose coverage regressed between a baseline and a current report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageDiff {
    report_type: CoverageType,
    policy: DiffPolicy,
    before_coverage: Option<f64>,
    after_coverage: Option<f64>,
    new_misses: Vec<EntityRef>,
}

impl CoverageDiff {
    /// Compare `before` with `after` using the default policy
    pub fn compute(before: &CoverageReport, after: &CoverageReport) -> CoverageResult<Self> {
        Self::compute_with(before, after, DiffPolicy::default())
    }

    /// Compare `before` with `after`
    ///
    /// Fails with [`CoverageError::TypeMismatch`] when the reports measure different things.
    pub fn compute_with(
        before: &CoverageReport,
        after: &CoverageReport,
        policy: DiffPolicy,
    ) -> CoverageResult<Self> {
        if before.report_type() != after.report_type() {
            return Err(CoverageError::TypeMismatch {
                before: before.report_type(),
                after: after.report_type(),
            });
        }

        let regressed = before
            .covered()
            .iter()
            .filter(|entity| after.misses().contains(*entity));
        let appeared = after.misses().iter().filter(|entity| {
            policy.include_new_entities && !before.total().contains(*entity)
        });
        let deleted = before.covered().iter().filter(|entity| {
            policy.include_deleted_entities && !after.total().contains(*entity)
        });

        let new_misses: BTreeSet<&EntityRef> = regressed.chain(appeared).chain(deleted).collect();
        let new_misses: Vec<EntityRef> = new_misses.into_iter().cloned().collect();

        tracing::debug!(
            report_type = %after.report_type(),
            new_misses = new_misses.len(),
            "compared coverage reports"
        );

        Ok(Self {
            report_type: after.report_type(),
            policy,
            before_coverage: before.coverage(),
            after_coverage: after.coverage(),
            new_misses,
        })
    }

    /// Coverage type of the compared reports
    #[must_use]
    pub const fn report_type(&self) -> CoverageType {
        self.report_type
    }

    /// Policy the diff was computed with
    #[must_use]
    pub const fn policy(&self) -> DiffPolicy {
        self.policy
    }

    /// Regressed entities, sorted by entity reference
    #[must_use]
    pub fn new_misses(&self) -> &[EntityRef] {
        &self.new_misses
    }

    /// Baseline coverage ratio
    #[must_use]
    pub const fn before_coverage(&self) -> Option<f64> {
        self.before_coverage
    }

    /// Current coverage ratio
    #[must_use]
    pub const fn after_coverage(&self) -> Option<f64> {
        self.after_coverage
    }

    /// Change in coverage ratio, when both sides are defined
    #[must_use]
    pub fn coverage_delta(&self) -> Option<f64> {
        match (self.before_coverage, self.after_coverage) {
            (Some(before), Some(after)) => Some(after - before),
            _ => None,
        }
    }

    /// New misses or a lower coverage ratio than the baseline
    #[must_use]
    pub fn is_regression(&self) -> bool {
        !self.new_misses.is_empty() || self.coverage_delta().is_some_and(|delta| delta < 0.0)
    }

    /// New misses grouped by owning table id
    #[must_use]
    pub fn new_misses_by_table(&self) -> BTreeMap<&str, Vec<&EntityRef>> {
        let mut grouped: BTreeMap<&str, Vec<&EntityRef>> = BTreeMap::new();
        for entity in &self.new_misses {
            grouped.entry(entity.table_id()).or_default().push(entity);
        }
        grouped
    }
}
