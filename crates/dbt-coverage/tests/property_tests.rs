//! Property-based tests for dbt-coverage.
//!
//! Uses proptest to check report invariants over arbitrary catalogs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use dbt_coverage::{
    Catalog, Column, CoverageDiff, CoverageOptions, CoverageReport, CoverageType, DiffPolicy,
    Table,
};
use proptest::prelude::*;

fn column_strategy() -> impl Strategy<Value = Column> {
    ("[a-z_]{1,8}", any::<bool>(), 0u32..5)
        .prop_map(|(name, doc, tests)| Column::new(name, doc, tests))
}

fn table_strategy(index: usize) -> impl Strategy<Value = Table> {
    (
        prop::collection::vec(column_strategy(), 0..6),
        any::<bool>(),
        0u32..3,
        "[a-z]{1,6}",
    )
        .prop_map(move |(columns, doc, tests, dir)| {
            Table::new(
                format!("model.prop.t{index}"),
                format!("t{index}"),
                format!("models/{dir}/t{index}.sql"),
                columns,
            )
            .with_doc(doc)
            .with_tests(tests)
        })
}

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    (0usize..5)
        .prop_flat_map(|n| (0..n).map(table_strategy).collect::<Vec<_>>())
        .prop_map(Catalog::new)
}

fn cov_type_strategy() -> impl Strategy<Value = CoverageType> {
    prop_oneof![Just(CoverageType::Doc), Just(CoverageType::Test)]
}

proptest! {
    /// Covered entities are always a subset of total.
    #[test]
    fn prop_covered_subset_of_total(
        catalog in catalog_strategy(),
        cov_type in cov_type_strategy(),
        include_tables in any::<bool>(),
    ) {
        let options = CoverageOptions::new().with_include_tables(include_tables);
        let report = CoverageReport::from_catalog_with(&catalog, cov_type, &options);
        prop_assert!(report.covered().is_subset(report.total()));
        for table in report.subentities().values() {
            prop_assert!(table.covered().is_subset(table.total()));
        }
    }

    /// Misses and covered partition total.
    #[test]
    fn prop_misses_partition_total(catalog in catalog_strategy(), cov_type in cov_type_strategy()) {
        let report = CoverageReport::from_catalog(&catalog, cov_type);
        prop_assert!(report.misses().is_disjoint(report.covered()));
        prop_assert_eq!(report.misses().len() + report.covered().len(), report.total().len());
    }

    /// Coverage is undefined exactly when there is nothing to cover, else within [0, 1].
    #[test]
    fn prop_coverage_ratio_bounds(catalog in catalog_strategy(), cov_type in cov_type_strategy()) {
        let report = CoverageReport::from_catalog(&catalog, cov_type);
        match report.coverage() {
            None => prop_assert!(report.total().is_empty()),
            Some(ratio) => {
                prop_assert!(!report.total().is_empty());
                prop_assert!((0.0..=1.0).contains(&ratio));
            }
        }
    }

    /// Doc hits count covered entities; test hits sum test counts.
    #[test]
    fn prop_hits_semantics(catalog in catalog_strategy()) {
        let doc = CoverageReport::from_catalog(&catalog, CoverageType::Doc);
        prop_assert_eq!(doc.hits(), doc.covered().len() as u64);

        let test = CoverageReport::from_catalog(&catalog, CoverageType::Test);
        let expected: u64 = catalog
            .tables()
            .values()
            .flat_map(|t| t.columns().values())
            .map(|c| u64::from(c.tests()))
            .sum();
        prop_assert_eq!(test.hits(), expected);
    }

    /// A report compared with itself never regresses, under any policy.
    #[test]
    fn prop_self_diff_is_empty(
        catalog in catalog_strategy(),
        cov_type in cov_type_strategy(),
        new_entities in any::<bool>(),
        deleted_entities in any::<bool>(),
    ) {
        let report = CoverageReport::from_catalog(&catalog, cov_type);
        let policy = DiffPolicy::new()
            .with_new_entities(new_entities)
            .with_deleted_entities(deleted_entities);
        let diff = CoverageDiff::compute_with(&report, &report, policy).unwrap();
        prop_assert!(diff.new_misses().is_empty());
        prop_assert!(!diff.is_regression());
    }

    /// New misses are sorted and never covered in the later report.
    #[test]
    fn prop_new_misses_sorted_and_uncovered(
        before in catalog_strategy(),
        after in catalog_strategy(),
        cov_type in cov_type_strategy(),
    ) {
        let before = CoverageReport::from_catalog(&before, cov_type);
        let after = CoverageReport::from_catalog(&after, cov_type);
        let diff = CoverageDiff::compute(&before, &after).unwrap();
        prop_assert!(diff.new_misses().windows(2).all(|w| w[0] < w[1]));
        for entity in diff.new_misses() {
            prop_assert!(!after.is_covered(entity));
        }
    }

    /// XML output is deterministic and always carries the declaration and root.
    #[test]
    fn prop_xml_well_formed_and_idempotent(
        catalog in catalog_strategy(),
        cov_type in cov_type_strategy(),
    ) {
        let report = CoverageReport::from_catalog(&catalog, cov_type);
        let xml = report.to_xml("/project");
        prop_assert!(xml.starts_with(r#"<?xml version="1.0" ?>"#));
        prop_assert!(xml.contains("<coverage "));
        prop_assert!(xml.trim_end().ends_with("</coverage>"));
        prop_assert_eq!(xml.matches("<package ").count(), catalog.len());
        prop_assert_eq!(xml, report.to_xml("/project"));
    }

    /// Every counted entity is written as exactly one class-level `<line>`.
    #[test]
    fn prop_xml_lines_match_lines_valid(
        catalog in catalog_strategy(),
        cov_type in cov_type_strategy(),
        include_tables in any::<bool>(),
    ) {
        let options = CoverageOptions::new().with_include_tables(include_tables);
        let report = CoverageReport::from_catalog_with(&catalog, cov_type, &options);
        let xml = report.to_xml("/project");
        let lines_valid = format!(r#"lines-valid="{}""#, report.total().len());
        prop_assert!(xml.contains(&lines_valid));
        prop_assert_eq!(xml.matches("\n            <line ").count(), report.total().len());
    }

    /// JSON snapshots load back to the same report.
    #[test]
    fn prop_json_snapshot_reloads(
        catalog in catalog_strategy(),
        cov_type in cov_type_strategy(),
        include_tables in any::<bool>(),
    ) {
        let options = CoverageOptions::new().with_include_tables(include_tables);
        let report = CoverageReport::from_catalog_with(&catalog, cov_type, &options);
        let loaded = CoverageReport::from_json(&report.to_json().unwrap()).unwrap();
        prop_assert_eq!(loaded, report);
    }
}
