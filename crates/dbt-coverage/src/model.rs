//! Catalog data model
//!
//! Structural metadata of a dbt project: tables (models, seeds, snapshots, sources)
//! and their columns, with documentation presence and test counts already resolved.
//! Values are immutable once built; filtering produces a new [`Catalog`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    doc: bool,
    tests: u32,
}

impl Column {
    /// Create a new column
    #[must_use]
    pub fn new(name: impl Into<String>, doc: bool, tests: u32) -> Self {
        Self {
            name: name.into(),
            doc,
            tests,
        }
    }

    /// Column name, unique within its table
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the column has a non-empty description
    #[must_use]
    pub const fn doc(&self) -> bool {
        self.doc
    }

    /// Number of data tests attached to the column
    #[must_use]
    pub const fn tests(&self) -> u32 {
        self.tests
    }
}

/// One modeled relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    unique_id: String,
    name: String,
    original_file_path: String,
    #[serde(default)]
    doc: bool,
    #[serde(default)]
    tests: u32,
    columns: BTreeMap<String, Column>,
}

impl Table {
    /// Create a new table from its columns
    ///
    /// Columns are keyed by name; a later column with the same name replaces an earlier one.
    #[must_use]
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        original_file_path: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            original_file_path: original_file_path.into(),
            doc: false,
            tests: 0,
            columns: columns
                .into_iter()
                .map(|column| (column.name.clone(), column))
                .collect(),
        }
    }

    /// Set the table-level documentation flag
    #[must_use]
    pub const fn with_doc(mut self, doc: bool) -> Self {
        self.doc = doc;
        self
    }

    /// Set the number of table-level tests (tests not bound to a column)
    #[must_use]
    pub const fn with_tests(mut self, tests: u32) -> Self {
        self.tests = tests;
        self
    }

    /// Globally unique identifier, e.g. `model.jaffle_shop.orders`
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the file defining the table, relative to the project root
    #[must_use]
    pub fn original_file_path(&self) -> &str {
        &self.original_file_path
    }

    /// Whether the table itself has a non-empty description
    #[must_use]
    pub const fn doc(&self) -> bool {
        self.doc
    }

    /// Number of table-level tests
    #[must_use]
    pub const fn tests(&self) -> u32 {
        self.tests
    }

    /// Columns keyed by name
    #[must_use]
    pub const fn columns(&self) -> &BTreeMap<String, Column> {
        &self.columns
    }

    /// Look up a column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

/// Every table under analysis, keyed by unique id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    /// Create a catalog from tables
    #[must_use]
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|table| (table.unique_id.clone(), table))
                .collect(),
        }
    }

    /// Create a catalog with no tables
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tables keyed by unique id
    #[must_use]
    pub const fn tables(&self) -> &BTreeMap<String, Table> {
        &self.tables
    }

    /// Look up a table by unique id
    #[must_use]
    pub fn table(&self, unique_id: &str) -> Option<&Table> {
        self.tables.get(unique_id)
    }

    /// Number of tables
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog holds no tables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Keep only tables whose `original_file_path` starts with one of `prefixes`
    ///
    /// An empty prefix list keeps every table.
    #[must_use]
    pub fn filter_by_path<S: AsRef<str>>(&self, prefixes: &[S]) -> Self {
        if prefixes.is_empty() {
            return self.clone();
        }
        let tables = self
            .tables
            .values()
            .filter(|table| {
                prefixes
                    .iter()
                    .any(|prefix| table.original_file_path.starts_with(prefix.as_ref()))
            })
            .cloned();
        Self::new(tables)
    }
}
