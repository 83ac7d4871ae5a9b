//! Coverage computation and comparison
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Catalog → CoverageReport::from_catalog → CoverageDiff::compute │
//! │                        ↓                                        │
//! │          Cobertura XML / JSON snapshot / text                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every report is computed for one [`CoverageType`]: `Doc` counts columns with a
//! description, `Test` counts columns with at least one data test.

mod diff;
mod entity;
pub mod formatters;
mod report;

pub use diff::{CoverageDiff, DiffPolicy};
pub use entity::{CoverageType, EntityRef, EntityType};
pub use formatters::{render_diff, CoberturaFormatter, TextFormat, TextFormatter};
pub use report::{CoverageOptions, CoverageReport};

#[cfg(test)]
mod tests;
