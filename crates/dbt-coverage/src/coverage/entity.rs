//! Coverage kinds and entity identifiers
//!
//! [`EntityRef`] orders by table id first and puts a table before its own columns, so
//! every set of entities iterates in a stable, reportable order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What is being measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageType {
    /// Documentation presence
    Doc,
    /// Presence of at least one data test
    Test,
}

impl CoverageType {
    /// Both coverage types
    pub const ALL: [Self; 2] = [Self::Doc, Self::Test];

    /// Lowercase name used in CLI arguments and file names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Test => "test",
        }
    }

    /// Classify one entity, returning whether it is covered and the hits it contributes
    ///
    /// Doc contributes one hit per documented entity; Test contributes its test count.
    #[must_use]
    pub fn classify(self, doc: bool, tests: u32) -> (bool, u64) {
        match self {
            Self::Doc => (doc, u64::from(doc)),
            Self::Test => (tests > 0, u64::from(tests)),
        }
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doc" | "docs" => Ok(Self::Doc),
            "test" | "tests" => Ok(Self::Test),
            other => Err(format!("unknown coverage type '{other}', expected 'doc' or 'test'")),
        }
    }
}

/// Level of a report in the catalog → table → column hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Whole catalog
    Catalog,
    /// One table
    Table,
    /// One column
    Column,
}

/// Identifier of a coverable entity
///
/// `column == None` refers to the table itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    table_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<String>,
}

impl EntityRef {
    /// Reference a table
    #[must_use]
    pub fn table(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column: None,
        }
    }

    /// Reference a column of a table
    #[must_use]
    pub fn column(table_id: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column: Some(column.into()),
        }
    }

    /// Unique id of the owning table
    #[must_use]
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Column name, `None` for a table entity
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Whether this refers to a table rather than a column
    #[must_use]
    pub const fn is_table(&self) -> bool {
        self.column.is_none()
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "{}.{}", self.table_id, column),
            None => f.write_str(&self.table_id),
        }
    }
}
