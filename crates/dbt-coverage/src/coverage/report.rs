//! Coverage Report Generation
//!
//! A [`CoverageReport`] is computed bottom-up: every column becomes a one-entity report,
//! a table report folds its column reports (plus the table itself when table entities are
//! enabled), and the catalog report folds the table reports. Reports are never mutated
//! after construction.
//!
//! Reports serialize to JSON snapshots so that a later run can be compared against them.

use super::formatters::CoberturaFormatter;
use super::{CoverageType, EntityRef, EntityType};
use crate::model::{Catalog, Column, Table};
use crate::result::{CoverageError, CoverageResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Knobs for report computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageOptions {
    /// Count each table as a coverable entity of its own (table-level doc / tests)
    #[serde(default)]
    pub include_tables: bool,
}

impl CoverageOptions {
    /// Create default options (columns only)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable table entities
    #[must_use]
    pub const fn with_include_tables(mut self, include_tables: bool) -> Self {
        self.include_tables = include_tables;
        self
    }
}

/// Covered/total/hits accumulated while folding child reports
#[derive(Debug, Default)]
struct Tally {
    covered: BTreeSet<EntityRef>,
    total: BTreeSet<EntityRef>,
    hits: u64,
}

impl Tally {
    fn absorb(mut self, child: &CoverageReport) -> Self {
        self.covered.extend(child.covered.iter().cloned());
        self.total.extend(child.total.iter().cloned());
        self.hits += child.hits;
        self
    }

    fn with_entity(mut self, entity: EntityRef, covered: bool, hits: u64) -> Self {
        if covered {
            let _ = self.covered.insert(entity.clone());
        }
        let _ = self.total.insert(entity);
        self.hits += hits;
        self
    }
}

/// Coverage of one catalog, table or column for a single [`CoverageType`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    report_type: CoverageType,
    entity_type: EntityType,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_file_path: Option<String>,
    covered: BTreeSet<EntityRef>,
    total: BTreeSet<EntityRef>,
    hits: u64,
    misses: BTreeSet<EntityRef>,
    coverage: Option<f64>,
    subentities: BTreeMap<String, CoverageReport>,
}

/// On-disk shape of a report; derived fields are recomputed on load
#[derive(Debug, Deserialize)]
struct ReportSnapshot {
    report_type: CoverageType,
    entity_type: EntityType,
    name: String,
    #[serde(default)]
    original_file_path: Option<String>,
    covered: BTreeSet<EntityRef>,
    total: BTreeSet<EntityRef>,
    hits: u64,
    #[serde(default)]
    subentities: BTreeMap<String, ReportSnapshot>,
}

impl CoverageReport {
    fn assemble(
        report_type: CoverageType,
        entity_type: EntityType,
        name: String,
        original_file_path: Option<String>,
        tally: Tally,
        subentities: BTreeMap<String, Self>,
    ) -> Self {
        let Tally {
            covered,
            total,
            hits,
        } = tally;
        let misses = total.difference(&covered).cloned().collect();
        let coverage = if total.is_empty() {
            None
        } else {
            Some(covered.len() as f64 / total.len() as f64)
        };
        Self {
            report_type,
            entity_type,
            name,
            original_file_path,
            covered,
            total,
            hits,
            misses,
            coverage,
            subentities,
        }
    }

    /// Compute the coverage of a whole catalog, counting columns only
    #[must_use]
    pub fn from_catalog(catalog: &Catalog, cov_type: CoverageType) -> Self {
        Self::from_catalog_with(catalog, cov_type, &CoverageOptions::default())
    }

    /// Compute the coverage of a whole catalog with explicit options
    #[must_use]
    pub fn from_catalog_with(
        catalog: &Catalog,
        cov_type: CoverageType,
        options: &CoverageOptions,
    ) -> Self {
        let subentities: BTreeMap<String, Self> = catalog
            .tables()
            .iter()
            .map(|(id, table)| (id.clone(), Self::from_table(table, cov_type, options)))
            .collect();
        let tally = subentities.values().fold(Tally::default(), Tally::absorb);

        let report = Self::assemble(
            cov_type,
            EntityType::Catalog,
            "catalog".to_string(),
            None,
            tally,
            subentities,
        );
        tracing::debug!(
            report_type = %cov_type,
            tables = catalog.len(),
            covered = report.covered.len(),
            total = report.total.len(),
            hits = report.hits,
            "computed catalog coverage"
        );
        report
    }

    /// Compute the coverage of one table
    #[must_use]
    pub fn from_table(table: &Table, cov_type: CoverageType, options: &CoverageOptions) -> Self {
        let subentities: BTreeMap<String, Self> = table
            .columns()
            .iter()
            .map(|(name, column)| {
                (
                    name.clone(),
                    Self::from_column(table.unique_id(), column, cov_type),
                )
            })
            .collect();

        let tally = subentities.values().fold(Tally::default(), Tally::absorb);
        let tally = if options.include_tables {
            let (covered, hits) = cov_type.classify(table.doc(), table.tests());
            tally.with_entity(EntityRef::table(table.unique_id()), covered, hits)
        } else {
            tally
        };

        Self::assemble(
            cov_type,
            EntityType::Table,
            table.name().to_string(),
            Some(table.original_file_path().to_string()),
            tally,
            subentities,
        )
    }

    /// Compute the coverage of one column of table `table_id`
    #[must_use]
    pub fn from_column(table_id: &str, column: &Column, cov_type: CoverageType) -> Self {
        let (covered, hits) = cov_type.classify(column.doc(), column.tests());
        let tally =
            Tally::default().with_entity(EntityRef::column(table_id, column.name()), covered, hits);
        Self::assemble(
            cov_type,
            EntityType::Column,
            column.name().to_string(),
            None,
            tally,
            BTreeMap::new(),
        )
    }

    /// Coverage type of this report
    #[must_use]
    pub const fn report_type(&self) -> CoverageType {
        self.report_type
    }

    /// Level of this report in the hierarchy
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Display name (table or column name, `catalog` for the root)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source path of a table report
    #[must_use]
    pub fn original_file_path(&self) -> Option<&str> {
        self.original_file_path.as_deref()
    }

    /// Covered entities
    #[must_use]
    pub const fn covered(&self) -> &BTreeSet<EntityRef> {
        &self.covered
    }

    /// All coverable entities
    #[must_use]
    pub const fn total(&self) -> &BTreeSet<EntityRef> {
        &self.total
    }

    /// Uncovered entities (`total - covered`)
    #[must_use]
    pub const fn misses(&self) -> &BTreeSet<EntityRef> {
        &self.misses
    }

    /// Sum of hits: documented entities for doc, tests over all entities for test
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Ratio of covered to total entities, `None` when there is nothing to cover
    #[must_use]
    pub const fn coverage(&self) -> Option<f64> {
        self.coverage
    }

    /// Coverage as a percentage, `None` when undefined
    #[must_use]
    pub fn coverage_percent(&self) -> Option<f64> {
        self.coverage.map(|ratio| ratio * 100.0)
    }

    /// Child reports: tables by unique id for a catalog, columns by name for a table
    #[must_use]
    pub const fn subentities(&self) -> &BTreeMap<String, Self> {
        &self.subentities
    }

    /// Look up a child report
    #[must_use]
    pub fn subentity(&self, key: &str) -> Option<&Self> {
        self.subentities.get(key)
    }

    /// Whether `entity` is covered
    #[must_use]
    pub fn is_covered(&self, entity: &EntityRef) -> bool {
        self.covered.contains(entity)
    }

    /// Render a Cobertura XML document, resolving file paths against `project_root`
    #[must_use]
    pub fn to_xml(&self, project_root: &str) -> String {
        CoberturaFormatter::new(self, project_root).generate()
    }

    /// Serialize as a pretty-printed JSON snapshot
    pub fn to_json(&self) -> CoverageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON snapshot, re-checking the report invariants
    pub fn from_json(json: &str) -> CoverageResult<Self> {
        let snapshot: ReportSnapshot = serde_json::from_str(json)?;
        Self::try_from(snapshot)
    }

    /// Write a JSON snapshot to `path`
    pub fn save_json(&self, path: &Path) -> CoverageResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a JSON snapshot from `path`
    pub fn load_json(path: &Path) -> CoverageResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl TryFrom<ReportSnapshot> for CoverageReport {
    type Error = CoverageError;

    fn try_from(snapshot: ReportSnapshot) -> CoverageResult<Self> {
        if !snapshot.covered.is_subset(&snapshot.total) {
            return Err(CoverageError::invalid_report(format!(
                "'{}': covered entities are not a subset of total",
                snapshot.name
            )));
        }

        let mut subentities = BTreeMap::new();
        for (key, child) in snapshot.subentities {
            let child = Self::try_from(child)?;
            if child.report_type != snapshot.report_type {
                return Err(CoverageError::invalid_report(format!(
                    "'{}': child '{key}' has {} coverage inside {} report",
                    snapshot.name, child.report_type, snapshot.report_type
                )));
            }
            if !child.total.is_subset(&snapshot.total)
                || !child.covered.is_subset(&snapshot.covered)
            {
                return Err(CoverageError::invalid_report(format!(
                    "'{}': child '{key}' has entities missing from its parent",
                    snapshot.name
                )));
            }
            let _ = subentities.insert(key, child);
        }
        check_hits(
            &snapshot.name,
            snapshot.report_type,
            &snapshot.covered,
            snapshot.hits,
            &subentities,
        )?;

        Ok(Self::assemble(
            snapshot.report_type,
            snapshot.entity_type,
            snapshot.name,
            snapshot.original_file_path,
            Tally {
                covered: snapshot.covered,
                total: snapshot.total,
                hits: snapshot.hits,
            },
            subentities,
        ))
    }
}

/// Check `hits` against the covered entities and the children's hits
///
/// Entities no child accounts for (a table counted as an entity of its own table report)
/// contribute `hits - sum(child hits)`: exactly one per covered entity for doc coverage,
/// at least one per covered entity for test coverage, and nothing when none is covered.
fn check_hits(
    name: &str,
    report_type: CoverageType,
    covered: &BTreeSet<EntityRef>,
    hits: u64,
    subentities: &BTreeMap<String, CoverageReport>,
) -> CoverageResult<()> {
    let child_hits: u64 = subentities.values().map(|child| child.hits).sum();
    let Some(own_hits) = hits.checked_sub(child_hits) else {
        return Err(CoverageError::invalid_report(format!(
            "'{name}': hits {hits} are below the sum of its children's hits {child_hits}"
        )));
    };
    let own_covered = covered
        .iter()
        .filter(|entity| !subentities.values().any(|child| child.total.contains(*entity)))
        .count() as u64;

    let consistent = match report_type {
        CoverageType::Doc => own_hits == own_covered,
        CoverageType::Test if own_covered == 0 => own_hits == 0,
        CoverageType::Test => own_hits >= own_covered,
    };
    if consistent {
        Ok(())
    } else {
        Err(CoverageError::invalid_report(format!(
            "'{name}': hits {hits} do not match its covered entities"
        )))
    }
}
