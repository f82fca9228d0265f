//! Text-only analysis of Razen documents.
//!
//! There is no grammar and no syntax tree. Each pass runs over the raw text
//! and is independent of every other pass:
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Text     │──▶│ extract    │──▶│ symbols      │──▶│ tokens      │
//! └──────────┘   │ (events)   │   │ (tables)     │   └─────────────┘
//!                └────────────┘   └──────────────┘
//!                      │
//!                      ▼
//!                ┌────────────┐   ┌──────────────┐   ┌─────────────┐
//!                │ validate   │──▶│ diagnostics  │──▶│ fixes       │
//!                │ (findings) │   │ (records)    │   │ (on demand) │
//!                └────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! Passes never fail. Input the matchers cannot make sense of produces no
//! events, and ambiguous events produce no findings.

mod completion;
mod diagnostics;
mod extract;
mod fixes;
mod kinds;
mod shape;
mod symbols;
mod text;
mod tokens;
mod validate;

use serde::Serialize;

pub use completion::{CompletionItem, CompletionKind};
pub use diagnostics::{
    Diagnostic, DiagnosticRule, FixCode, Position, Range, Severity, SOURCE_TAG,
};
pub use extract::{extract, BoundCall, Declaration, Event, Import, LibraryCall, Span};
pub use fixes::{apply_edits, CodeAction, TextEdit, QUICKFIX_KIND};
pub use kinds::{kind_for_keyword, DeclaredKind, DECLARATION_KEYWORDS, IMPORT_KEYWORDS};
pub use shape::{classify, Shape};
pub use symbols::{LibraryEntry, SymbolTables, VariableEntry};
pub use tokens::{modifiers, SemanticToken, TokenCategory};
pub use validate::{validate, Finding};

use crate::registry::LibraryRegistry;

/// Output of one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub document: String,
    pub diagnostics: Vec<Diagnostic>,
    pub tokens: Vec<SemanticToken>,
}

impl Analysis {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Stateless analyzer over an injected library registry.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'r> {
    registry: &'r LibraryRegistry,
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self::new(LibraryRegistry::global())
    }
}

impl<'r> Analyzer<'r> {
    pub fn new(registry: &'r LibraryRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r LibraryRegistry {
        self.registry
    }

    /// Run a full pass over `text`.
    pub fn analyze(&self, document: &str, text: &str) -> Analysis {
        let span = tracing::debug_span!("analyze", document);
        let _guard = span.enter();

        let events = extract(text);
        let tables = SymbolTables::build(text, &events, self.registry);
        let diagnostics = diagnostics::aggregate(validate(&events, self.registry));
        let tokens = tokens::build(&tables);

        tracing::debug!(
            events = events.len(),
            diagnostics = diagnostics.len(),
            tokens = tokens.len(),
            "analysis pass complete"
        );

        Analysis {
            document: document.to_string(),
            diagnostics,
            tokens,
        }
    }

    /// Symbol tables for `text`, without validation.
    pub fn symbols(&self, text: &str) -> SymbolTables {
        SymbolTables::build(text, &extract(text), self.registry)
    }

    /// Quick fixes for the given diagnostics against the current text.
    pub fn code_actions(
        &self,
        document: &str,
        text: &str,
        diagnostics: &[Diagnostic],
    ) -> Vec<CodeAction> {
        diagnostics
            .iter()
            .filter_map(|d| fixes::propose(document, text, d))
            .collect()
    }

    /// Apply quick fixes until none are left. Returns the fixed text and the
    /// number of edits actually applied.
    ///
    /// Overlapping edits (a legacy call nested in another) cannot go in one
    /// round, so each round re-analyzes the text the previous one produced.
    pub fn fix_all(&self, text: &str) -> (String, usize) {
        let mut current = text.to_string();
        let mut total = 0;
        loop {
            let analysis = self.analyze("", &current);
            let edits: Vec<TextEdit> = self
                .code_actions("", &current, &analysis.diagnostics)
                .into_iter()
                .map(|action| action.edit)
                .collect();
            let (fixed, applied) = apply_edits(&current, &edits);
            if applied == 0 {
                break;
            }
            tracing::debug!(applied, "fix round");
            total += applied;
            current = fixed;
        }
        (current, total)
    }

    pub fn complete(&self, text: &str, position: Position) -> Vec<CompletionItem> {
        completion::complete(text, position, self.registry)
    }
}
