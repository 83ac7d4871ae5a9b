//! Coverage Report Formatters
//!
//! Cobertura XML for CI integration, plain text and markdown for humans.

mod cobertura;
mod text;

pub use cobertura::CoberturaFormatter;
pub use text::{render_diff, TextFormat, TextFormatter};
