//! Razencheck - incremental static analysis for the Razen scripting language.
//!
//! Razencheck analyzes Razen source text without a parser or syntax tree.
//! Every pass re-reads the whole document and produces diagnostics,
//! semantic tokens and, on request, quick fixes. Passes share no state, so
//! they are cheap to repeat on every edit and tolerate half-typed input.
//!
//! # Architecture
//!
//! - `analysis`: extraction, shape classification, symbol tables,
//!   validation, diagnostics, semantic tokens, quick fixes, completion
//! - `registry`: static catalog of the Razen standard libraries
//! - `config`: YAML configuration for batch checks
//! - `runner`: file collection and parallel batch analysis
//! - `report`: output formatting (pretty, JSON, SARIF)
//! - `server`: line-delimited JSON host loop for editors
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```
//! let analysis = razencheck::analyze("demo.rzn", "let x = \"hello\"");
//! assert_eq!(analysis.diagnostics.len(), 1);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod logging;
pub mod registry;
pub mod report;
pub mod runner;
pub mod server;

pub use analysis::{
    Analysis, Analyzer, CodeAction, CompletionItem, Diagnostic, DiagnosticRule, SemanticToken,
    Severity,
};
pub use config::{Config, ConfigError};
pub use registry::LibraryRegistry;
pub use runner::{CheckResult, Runner};
pub use server::{ProtocolError, Session};

/// Analyze `text` with the built-in library registry.
pub fn analyze(document: &str, text: &str) -> Analysis {
    Analyzer::default().analyze(document, text)
}
