//! dbt run artifact loading
//!
//! Builds a [`Catalog`] from the two files `dbt docs generate` leaves in the run artifacts
//! directory:
//!
//! - `catalog.json`: which tables and columns exist in the warehouse
//! - `manifest.json`: descriptions, source file paths and data tests
//!
//! Warehouses often upper-case identifiers, so columns are matched case-insensitively;
//! the spelling from `catalog.json` is kept.

use crate::model::{Catalog, Column, Table};
use crate::result::{CoverageError, CoverageResult};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// File name of the warehouse catalog artifact
pub const CATALOG_FILE: &str = "catalog.json";

/// File name of the project manifest artifact
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Default, Deserialize)]
struct CatalogArtifact {
    #[serde(default)]
    nodes: BTreeMap<String, CatalogNode>,
    #[serde(default)]
    sources: BTreeMap<String, CatalogNode>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogNode {
    #[serde(default)]
    metadata: CatalogMetadata,
    #[serde(default)]
    columns: BTreeMap<String, CatalogColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogMetadata {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogColumn {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestArtifact {
    #[serde(default)]
    nodes: BTreeMap<String, ManifestNode>,
    #[serde(default)]
    sources: BTreeMap<String, ManifestNode>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestNode {
    #[serde(default)]
    resource_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    original_file_path: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    columns: BTreeMap<String, ManifestColumn>,
    #[serde(default)]
    depends_on: DependsOn,
    #[serde(default)]
    column_name: Option<String>,
    #[serde(default)]
    attached_node: Option<String>,
    #[serde(default)]
    test_metadata: Option<TestMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestColumn {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DependsOn {
    #[serde(default)]
    nodes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TestMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    kwargs: HashMap<String, serde_json::Value>,
}

impl ManifestNode {
    fn is_test(&self) -> bool {
        self.resource_type == "test"
    }

    /// Column a test is attached to, unquoted and lower-cased
    fn tested_column(&self) -> Option<String> {
        let raw = self.column_name.clone().or_else(|| {
            self.test_metadata
                .as_ref()
                .and_then(|meta| meta.kwargs.get("column_name"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })?;
        let column = raw.trim().trim_matches(|c: char| c == '"' || c == '`').to_lowercase();
        (!column.is_empty()).then_some(column)
    }

    /// Unique id of the model a test is defined on
    ///
    /// A test can depend on several nodes (`relationships` also refs the target model), but
    /// only one of them is tested. Resolution order: `attached_node`, the model named in the
    /// `model` kwarg, then the last dependency for `relationships` and the first otherwise.
    fn tested_node(&self) -> Option<&str> {
        if let Some(node) = self.attached_node.as_deref().filter(|node| !node.is_empty()) {
            return Some(node);
        }
        let metadata = self.test_metadata.as_ref();
        let model_kwarg = metadata
            .and_then(|meta| meta.kwargs.get("model"))
            .and_then(serde_json::Value::as_str)
            .and_then(referenced_name);
        if let Some(name) = model_kwarg {
            let named = self
                .depends_on
                .nodes
                .iter()
                .find(|node| node.rsplit('.').next() == Some(name));
            if let Some(node) = named {
                return Some(node.as_str());
            }
        }
        let is_relationships = metadata.is_some_and(|meta| meta.name == "relationships");
        let node = if is_relationships {
            self.depends_on.nodes.last()
        } else {
            self.depends_on.nodes.first()
        };
        node.map(String::as_str)
    }
}

/// Model name inside a `ref('...')` / `source('...', '...')` kwarg, i.e. its last quoted word
fn referenced_name(model: &str) -> Option<&str> {
    model
        .split(['\'', '"'])
        .skip(1)
        .step_by(2)
        .last()
        .filter(|name| !name.is_empty())
}

fn has_text(description: Option<&str>) -> bool {
    description.is_some_and(|d| !d.trim().is_empty())
}

/// Test counts per table and per (table, lower-cased column)
#[derive(Debug, Default)]
struct TestCounts {
    tables: HashMap<String, u32>,
    columns: HashMap<(String, String), u32>,
}

impl TestCounts {
    fn collect(manifest: &ManifestArtifact, catalog: &CatalogArtifact) -> Self {
        let mut counts = Self::default();
        for test in manifest.nodes.values().filter(|node| node.is_test()) {
            let Some(table_id) = test.tested_node() else {
                continue;
            };
            let Some(table) = catalog
                .nodes
                .get(table_id)
                .or_else(|| catalog.sources.get(table_id))
            else {
                continue;
            };
            let column = test.tested_column().filter(|column| {
                table.columns.values().any(|c| c.name.to_lowercase() == *column)
            });
            match column {
                Some(column) => {
                    *counts
                        .columns
                        .entry((table_id.to_string(), column))
                        .or_insert(0) += 1;
                }
                None => *counts.tables.entry(table_id.to_string()).or_insert(0) += 1,
            }
        }
        counts
    }

    fn table(&self, table_id: &str) -> u32 {
        self.tables.get(table_id).copied().unwrap_or(0)
    }

    fn column(&self, table_id: &str, column: &str) -> u32 {
        self.columns
            .get(&(table_id.to_string(), column.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

/// Load `catalog.json` and `manifest.json` from `run_artifacts_dir`
pub fn load_catalog(run_artifacts_dir: &Path) -> CoverageResult<Catalog> {
    let catalog_json = read_artifact(&run_artifacts_dir.join(CATALOG_FILE))?;
    let manifest_json = read_artifact(&run_artifacts_dir.join(MANIFEST_FILE))?;
    catalog_from_artifacts(&catalog_json, &manifest_json)
}

fn read_artifact(path: &Path) -> CoverageResult<String> {
    if !path.exists() {
        return Err(CoverageError::artifact(
            path,
            "file not found, run `dbt docs generate` first",
        ));
    }
    tracing::debug!(path = %path.display(), "reading artifact");
    Ok(std::fs::read_to_string(path)?)
}

/// Build a catalog from the contents of `catalog.json` and `manifest.json`
pub fn catalog_from_artifacts(catalog_json: &str, manifest_json: &str) -> CoverageResult<Catalog> {
    let catalog: CatalogArtifact = serde_json::from_str(catalog_json)?;
    let manifest: ManifestArtifact = serde_json::from_str(manifest_json)?;
    let tests = TestCounts::collect(&manifest, &catalog);

    let mut tables = Vec::new();
    for (table_id, node) in catalog.nodes.iter().chain(catalog.sources.iter()) {
        let Some(definition) = manifest
            .nodes
            .get(table_id)
            .or_else(|| manifest.sources.get(table_id))
        else {
            tracing::warn!(table_id = %table_id, "table missing from manifest, skipping");
            continue;
        };
        tables.push(build_table(table_id, node, definition, &tests));
    }

    let catalog = Catalog::new(tables);
    tracing::debug!(tables = catalog.len(), "loaded catalog from artifacts");
    Ok(catalog)
}

fn build_table(
    table_id: &str,
    node: &CatalogNode,
    definition: &ManifestNode,
    tests: &TestCounts,
) -> Table {
    let documented: HashMap<String, bool> = definition
        .columns
        .iter()
        .map(|(key, column)| {
            let name = if column.name.is_empty() { key } else { &column.name };
            (name.to_lowercase(), has_text(column.description.as_deref()))
        })
        .collect();

    let columns = node.columns.values().map(|column| {
        let key = column.name.to_lowercase();
        Column::new(
            column.name.clone(),
            documented.get(&key).copied().unwrap_or(false),
            tests.column(table_id, &key),
        )
    });

    let name = if definition.name.is_empty() {
        node.metadata.name.clone()
    } else {
        definition.name.clone()
    };

    Table::new(table_id, name, definition.original_file_path.clone(), columns)
        .with_doc(has_text(definition.description.as_deref()))
        .with_tests(tests.table(table_id))
}
