//! Scenario tests for coverage computation, comparison and serialization
//!
//! Uses a two-table catalog (`users`, `orders`) and the empty catalog as fixtures.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use super::*;
use crate::model::{Catalog, Column, Table};

fn create_test_catalog() -> Catalog {
    let users = Table::new(
        "model.test.users",
        "users",
        "models/users.sql",
        [
            Column::new("id", true, 2),
            Column::new("name", true, 1),
            Column::new("email", false, 0),
        ],
    );
    let orders = Table::new(
        "model.test.orders",
        "orders",
        "models/orders.sql",
        [
            Column::new("order_id", true, 1),
            Column::new("user_id", true, 1),
            Column::new("total", true, 0),
        ],
    );
    Catalog::new([users, orders])
}

// ============================================================================
// Empty catalog
// ============================================================================

mod empty_catalog_tests {
    use super::*;

    #[test]
    fn test_coverage_report_with_zero_tables() {
        for cov_type in CoverageType::ALL {
            let report = CoverageReport::from_catalog(&Catalog::empty(), cov_type);

            assert!(report.covered().is_empty());
            assert_eq!(report.hits(), 0);
            assert!(report.total().is_empty());
            assert_eq!(report.coverage(), None);
            assert!(report.misses().is_empty());
            assert!(report.subentities().is_empty());
        }
    }

    #[test]
    fn test_coverage_diff_with_zero_tables() {
        for cov_type in CoverageType::ALL {
            let report_1 = CoverageReport::from_catalog(&Catalog::empty(), cov_type);
            let report_2 = CoverageReport::from_catalog(&Catalog::empty(), cov_type);

            let diff = CoverageDiff::compute(&report_1, &report_2).unwrap();
            assert!(diff.new_misses().is_empty());
        }
    }

    #[test]
    fn test_empty_catalog_xml() {
        let report = CoverageReport::from_catalog(&Catalog::empty(), CoverageType::Doc);
        let xml = report.to_xml("/path/to/project");

        assert!(xml.starts_with(r#"<?xml version="1.0" ?>"#));
        assert!(xml.contains("<coverage "));
        assert!(xml.contains(r#"line-rate="0""#));
    }

    #[test]
    fn test_empty_catalog_json_round_trip() {
        let report = CoverageReport::from_catalog(&Catalog::empty(), CoverageType::Test);
        let loaded = CoverageReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(loaded.coverage(), None);
        assert!(loaded.subentities().is_empty());
    }
}

// ============================================================================
// Two-table scenario
// ============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_doc_report_totals() {
        let report = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Doc);

        assert_eq!(report.total().len(), 6);
        assert_eq!(report.covered().len(), 5);
        assert_eq!(report.hits(), 5);
        assert_eq!(
            report.misses().iter().collect::<Vec<_>>(),
            vec![&EntityRef::column("model.test.users", "email")]
        );
        assert_eq!(report.coverage(), Some(5.0 / 6.0));
    }

    #[test]
    fn test_doc_report_with_table_entities() {
        let options = CoverageOptions::new().with_include_tables(true);
        let report =
            CoverageReport::from_catalog_with(&create_test_catalog(), CoverageType::Doc, &options);

        // Neither table carries a table-level description
        assert_eq!(report.total().len(), 8);
        assert_eq!(report.covered().len(), 5);
    }

    #[test]
    fn test_test_report_hits_per_table() {
        let report = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Test);

        assert_eq!(report.subentity("model.test.users").unwrap().hits(), 3);
        assert_eq!(report.subentity("model.test.orders").unwrap().hits(), 2);
        assert_eq!(report.hits(), 5);
        assert_eq!(report.covered().len(), 4);
    }

    /// Test hits sum over all entities; uncovered entities carry zero tests, so the sum
    /// over covered entities is the same number.
    #[test]
    fn test_test_hits_sum_over_all_entities() {
        let catalog = create_test_catalog();
        let report = CoverageReport::from_catalog(&catalog, CoverageType::Test);

        let all: u64 = catalog
            .tables()
            .values()
            .flat_map(|t| t.columns().values())
            .map(|c| u64::from(c.tests()))
            .sum();
        let covered_only: u64 = catalog
            .tables()
            .values()
            .flat_map(|t| t.columns().values())
            .filter(|c| c.tests() > 0)
            .map(|c| u64::from(c.tests()))
            .sum();

        assert_eq!(report.hits(), all);
        assert_eq!(report.hits(), covered_only);
    }

    #[test]
    fn test_table_subreports_partition_catalog() {
        let report = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Doc);
        let table_total: usize = report.subentities().values().map(|t| t.total().len()).sum();
        assert_eq!(table_total, report.total().len());

        let users = report.subentity("model.test.users").unwrap();
        assert_eq!(users.entity_type(), EntityType::Table);
        assert_eq!(users.subentity("email").unwrap().coverage(), Some(0.0));
    }

    #[test]
    fn test_doc_coverage_xml() {
        let report = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Doc);
        let xml = report.to_xml("/path/to/project");

        assert!(xml.contains(r#"<?xml version="1.0" ?>"#));
        assert!(xml.contains("coverage"));
        assert!(xml.contains("line-rate"));
        assert!(xml.contains(r#"<package name="users""#));
        assert!(xml.contains(r#"<package name="orders""#));
        assert!(xml.contains(r#"filename="/path/to/project/models/orders.sql""#));
    }

    #[test]
    fn test_test_coverage_xml() {
        let report = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Test);
        let xml = report.to_xml("/path/to/project");

        assert!(xml.contains(r#"<?xml version="1.0" ?>"#));
        assert!(xml.contains("coverage"));
        assert!(xml.contains("hits"));
        assert!(xml.contains(r#"hits="2""#));
    }

    #[test]
    fn test_to_xml_is_idempotent() {
        let report = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Test);
        assert_eq!(report.to_xml("/p"), report.to_xml("/p"));
    }

    #[test]
    fn test_removing_docs_regresses() {
        let before = CoverageReport::from_catalog(&create_test_catalog(), CoverageType::Doc);
        let catalog = Catalog::new([Table::new(
            "model.test.orders",
            "orders",
            "models/orders.sql",
            [
                Column::new("order_id", true, 1),
                Column::new("user_id", false, 1),
                Column::new("total", true, 0),
            ],
        )]);
        let after = CoverageReport::from_catalog(&catalog, CoverageType::Doc);

        let diff = CoverageDiff::compute(&before, &after).unwrap();
        assert_eq!(
            diff.new_misses(),
            &[EntityRef::column("model.test.orders", "user_id")]
        );
    }
}
