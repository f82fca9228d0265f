//! Semantic tokens replayed from the symbol tables.

use serde::{Deserialize, Serialize};

use super::extract::Span;
use super::symbols::SymbolTables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Variable,
    Library,
}

impl TokenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Variable => "variable",
            TokenCategory::Library => "library",
        }
    }
}

impl std::fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token modifier bits.
pub mod modifiers {
    pub const DECLARATION: u32 = 1;
    pub const UNUSED: u32 = 2;
    pub const USED: u32 = 4;

    /// Modifier names in bit order, for legends.
    pub const LEGEND: [&str; 3] = ["declaration", "unused", "used"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticToken {
    pub line: u32,
    pub start_col: u32,
    pub length: u32,
    pub token_type: TokenCategory,
    pub token_modifiers: u32,
}

impl SemanticToken {
    fn new(span: Span, token_type: TokenCategory, token_modifiers: u32) -> Self {
        Self {
            line: span.line,
            start_col: span.start,
            length: span.len(),
            token_type,
            token_modifiers,
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.token_modifiers & modifiers::DECLARATION != 0
    }
}

/// Declaration token plus one `used` token per reference, for every entry,
/// sorted by position.
pub fn build(tables: &SymbolTables) -> Vec<SemanticToken> {
    let mut tokens = Vec::new();

    for (name, entry) in &tables.variables {
        tokens.push(SemanticToken::new(
            entry.span,
            TokenCategory::Variable,
            declaration_modifiers(entry.used),
        ));
        if let Some(references) = tables.variable_references.get(name) {
            tokens.extend(
                references
                    .iter()
                    .map(|span| SemanticToken::new(*span, TokenCategory::Variable, modifiers::USED)),
            );
        }
    }

    for (name, entry) in &tables.libraries {
        tokens.push(SemanticToken::new(
            entry.span,
            TokenCategory::Library,
            declaration_modifiers(entry.used),
        ));
        if let Some(references) = tables.library_references.get(name) {
            tokens.extend(
                references
                    .iter()
                    .map(|span| SemanticToken::new(*span, TokenCategory::Library, modifiers::USED)),
            );
        }
    }

    tokens.sort_by_key(|t| (t.line, t.start_col, t.token_type));
    tokens.dedup();
    tokens
}

fn declaration_modifiers(used: bool) -> u32 {
    modifiers::DECLARATION
        | if used {
            modifiers::USED
        } else {
            modifiers::UNUSED
        }
}
