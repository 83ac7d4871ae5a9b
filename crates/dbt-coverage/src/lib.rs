//! dbt-coverage: documentation and test coverage for dbt projects
//!
//! Measures how many columns of a dbt project are documented (`doc`) or covered by at
//! least one data test (`test`), renders the result as Cobertura XML, JSON or text, and
//! compares two snapshots to catch coverage regressions in CI.
//!
//! ```
//! use dbt_coverage::{Catalog, Column, CoverageReport, CoverageType, Table};
//!
//! let catalog = Catalog::new([Table::new(
//!     "model.shop.users",
//!     "users",
//!     "models/users.sql",
//!     [Column::new("id", true, 2), Column::new("email", false, 0)],
//! )]);
//!
//! let report = CoverageReport::from_catalog(&catalog, CoverageType::Doc);
//! assert_eq!(report.coverage(), Some(0.5));
//! assert!(report.to_xml("/project").starts_with(r#"<?xml version="1.0" ?>"#));
//! ```

#![warn(missing_docs)]

pub mod artifacts;
pub mod coverage;
mod model;
mod result;

pub use artifacts::{catalog_from_artifacts, load_catalog, CATALOG_FILE, MANIFEST_FILE};
pub use coverage::{
    render_diff, CoberturaFormatter, CoverageDiff, CoverageOptions, CoverageReport, CoverageType,
    DiffPolicy, EntityRef, EntityType, TextFormat, TextFormatter,
};
pub use model::{Catalog, Column, Table};
pub use result::{CoverageError, CoverageResult};
