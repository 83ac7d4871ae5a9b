//! Cobertura XML Coverage Report Formatter
//!
//! Maps the catalog hierarchy onto Cobertura so generic coverage viewers can display it:
//! one package and one class per table, one method and one line per column.
//!
//! ```xml
//! <?xml version="1.0" ?>
//! <!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd">
//! <coverage line-rate="0.8333" branch-rate="0" lines-covered="5" lines-valid="6" ...>
//!   <sources>
//!     <source>/path/to/project</source>
//!   </sources>
//!   <packages>
//!     <package name="users" line-rate="0.6667" branch-rate="0" complexity="0">
//!       <classes>
//!         <class name="users" filename="/path/to/project/models/users.sql" line-rate="0.6667" ...>
//!           <methods>
//!             <method name="email" signature="" line-rate="0.0000" branch-rate="0">
//!               <lines>
//!                 <line number="1" hits="0"/>
//!               </lines>
//!             </method>
//!           </methods>
//!           <lines>
//!             <line number="1" hits="0"/>
//!           </lines>
//!         </class>
//!       </classes>
//!     </package>
//!   </packages>
//! </coverage>
//! ```
//!
//! Line hits are 0/1 for doc coverage and the column's test count for test coverage.
//! When tables are counted as entities, each class also gets a `<line number="0">` for the
//! table itself, so the class lines always add up to `lines-valid`.
//! An undefined coverage ratio is written as `0`.

use crate::coverage::{CoverageReport, EntityRef, EntityType};
use crate::result::CoverageResult;
use std::fmt::Write;
use std::path::Path;

/// Cobertura XML format report generator
#[derive(Debug)]
pub struct CoberturaFormatter<'a> {
    report: &'a CoverageReport,
    project_root: String,
    version: String,
}

impl<'a> CoberturaFormatter<'a> {
    /// Create a new Cobertura formatter
    #[must_use]
    pub fn new(report: &'a CoverageReport, project_root: impl Into<String>) -> Self {
        Self {
            report,
            project_root: project_root.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Generate Cobertura XML report as a string
    #[must_use]
    pub fn generate(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" ?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd">"#,
        );
        xml.push('\n');
        let _ = write!(
            xml,
            r#"<coverage line-rate="{}" branch-rate="0" lines-covered="{}" lines-valid="{}" branches-covered="0" branches-valid="0" complexity="0" version="{}" timestamp="0">"#,
            format_rate(self.report.coverage()),
            self.report.covered().len(),
            self.report.total().len(),
            escape_xml(&self.version),
        );
        xml.push('\n');

        xml.push_str("  <sources>\n");
        let _ = writeln!(
            xml,
            "    <source>{}</source>",
            escape_xml(&self.project_root)
        );
        xml.push_str("  </sources>\n");

        xml.push_str("  <packages>\n");
        for table in self.tables() {
            self.write_table(&mut xml, table);
        }
        xml.push_str("  </packages>\n");
        xml.push_str("</coverage>\n");

        xml
    }

    /// Save the Cobertura report to a file
    ///
    /// # Errors
    ///
    /// Returns error if file write fails
    pub fn save(&self, path: &Path) -> CoverageResult<()> {
        let content = self.generate();
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Table reports to emit as packages
    fn tables(&self) -> Vec<&CoverageReport> {
        match self.report.entity_type() {
            EntityType::Catalog => self.report.subentities().values().collect(),
            EntityType::Table => vec![self.report],
            EntityType::Column => Vec::new(),
        }
    }

    fn write_table(&self, xml: &mut String, table: &CoverageReport) {
        let name = escape_xml(table.name());
        let rate = format_rate(table.coverage());
        let filename =
            escape_xml(&self.resolve_path(table.original_file_path().unwrap_or_default()));

        let _ = writeln!(
            xml,
            r#"    <package name="{name}" line-rate="{rate}" branch-rate="0" complexity="0">"#
        );
        xml.push_str("      <classes>\n");
        let _ = writeln!(
            xml,
            r#"        <class name="{name}" filename="{filename}" line-rate="{rate}" branch-rate="0" complexity="0">"#
        );

        xml.push_str("          <methods>\n");
        for (number, column) in (1..).zip(table.subentities().values()) {
            let _ = writeln!(
                xml,
                r#"            <method name="{}" signature="" line-rate="{}" branch-rate="0">"#,
                escape_xml(column.name()),
                format_rate(column.coverage()),
            );
            xml.push_str("              <lines>\n");
            let _ = writeln!(
                xml,
                r#"                <line number="{}" hits="{}"/>"#,
                number,
                column.hits()
            );
            xml.push_str("              </lines>\n");
            xml.push_str("            </method>\n");
        }
        xml.push_str("          </methods>\n");

        xml.push_str("          <lines>\n");
        if let Some(hits) = table_entity_hits(table) {
            let _ = writeln!(xml, r#"            <line number="0" hits="{hits}"/>"#);
        }
        for (number, column) in (1..).zip(table.subentities().values()) {
            let _ = writeln!(
                xml,
                r#"            <line number="{}" hits="{}"/>"#,
                number,
                column.hits()
            );
        }
        xml.push_str("          </lines>\n");

        xml.push_str("        </class>\n");
        xml.push_str("      </classes>\n");
        xml.push_str("    </package>\n");
    }

    /// Join a project-relative path onto the project root
    fn resolve_path(&self, relative: &str) -> String {
        let root = self.project_root.trim_end_matches('/');
        if root.is_empty() {
            relative.to_string()
        } else {
            format!("{root}/{}", relative.trim_start_matches('/'))
        }
    }
}

/// Hits of the table itself, `None` unless the table is counted as an entity
fn table_entity_hits(table: &CoverageReport) -> Option<u64> {
    table.total().iter().any(EntityRef::is_table).then(|| {
        let column_hits: u64 = table.subentities().values().map(CoverageReport::hits).sum();
        table.hits().saturating_sub(column_hits)
    })
}

/// Format a coverage ratio, writing undefined coverage as `0`
fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "0".to_string(), |rate| format!("{rate:.4}"))
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
