//! Per-pass symbol tables: declared variables and imported libraries.

use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use super::extract::{Event, Span};
use super::kinds::DeclaredKind;
use super::text::{code_end, is_comment_line, mask_strings};
use crate::registry::LibraryRegistry;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap();
}

/// A declared variable. Redeclaration replaces the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableEntry {
    /// Span of the name at the declaration site.
    pub span: Span,
    /// The whole declaring statement. Its initializer reads the previous
    /// binding, so only occurrences past it are uses of this entry.
    pub statement: Span,
    pub kind: DeclaredKind,
    pub used: bool,
}

/// An imported library, keyed by its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Span of the name at the import site.
    pub span: Span,
    pub used: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTables {
    pub variables: BTreeMap<String, VariableEntry>,
    pub libraries: BTreeMap<&'static str, LibraryEntry>,
    /// Occurrences that count as uses of each variable, in text order.
    pub variable_references: BTreeMap<String, Vec<Span>>,
    /// Call-site library-name spans for each imported library.
    pub library_references: BTreeMap<&'static str, Vec<Span>>,
}

impl SymbolTables {
    /// Build the tables for one pass from the extracted events.
    pub fn build(text: &str, events: &[Event], registry: &LibraryRegistry) -> Self {
        let mut tables = SymbolTables::default();
        // Spans that are never variable references.
        let mut sites: HashSet<Span> = HashSet::new();

        for event in events {
            match event {
                Event::Declaration(decl) => {
                    sites.insert(decl.name_span);
                    tables.variables.insert(
                        decl.name.clone(),
                        VariableEntry {
                            span: decl.name_span,
                            statement: decl.statement_span,
                            kind: decl.kind,
                            used: false,
                        },
                    );
                }
                Event::Import(import) => {
                    sites.insert(import.span);
                    if let Some(canonical) = registry.canonical_name(&import.name) {
                        tables.libraries.insert(
                            canonical,
                            LibraryEntry {
                                span: import.span,
                                used: false,
                            },
                        );
                    }
                }
                Event::LibraryCall(call) => {
                    // An unresolved bracket call is plain indexing; its
                    // identifiers are ordinary references.
                    if !call.legacy || registry.is_library(&call.library) {
                        sites.insert(call.library_span);
                        sites.insert(call.function_span);
                    }
                }
            }
        }

        for event in events {
            let Event::LibraryCall(call) = event else {
                continue;
            };
            let Some(canonical) = registry.canonical_name(&call.library) else {
                continue;
            };
            if let Some(entry) = tables.libraries.get_mut(canonical) {
                entry.used = true;
                tables
                    .library_references
                    .entry(canonical)
                    .or_default()
                    .push(call.library_span);
            }
        }

        tables.mark_variable_uses(text, &sites, registry);

        tracing::trace!(
            variables = tables.variables.len(),
            libraries = tables.libraries.len(),
            "symbol tables built"
        );
        tables
    }

    fn mark_variable_uses(&mut self, text: &str, sites: &HashSet<Span>, registry: &LibraryRegistry) {
        if self.variables.is_empty() {
            return;
        }

        for (index, line) in text.lines().enumerate() {
            if is_comment_line(line) {
                continue;
            }
            let masked_line = mask_strings(line);
            let masked = &masked_line[..code_end(&masked_line)];

            for word in WORD_RE.find_iter(masked) {
                let name = word.as_str();
                let Some(entry) = self.variables.get_mut(name) else {
                    continue;
                };
                // member access, not a variable
                if masked[..word.start()].ends_with('.') || registry.is_library(name) {
                    continue;
                }
                let span = Span::from_bytes(index as u32, line, word.range());
                if sites.contains(&span) || !span.is_past(&entry.statement) {
                    continue;
                }
                entry.used = true;
                self.variable_references
                    .entry(name.to_string())
                    .or_default()
                    .push(span);
            }
        }
    }

    pub fn variable(&self, name: &str) -> Option<&VariableEntry> {
        self.variables.get(name)
    }

    /// Library entry by any spelling of its name.
    pub fn library(&self, name: &str) -> Option<&LibraryEntry> {
        self.libraries.get(name.to_ascii_lowercase().as_str())
    }

    /// Names of declared variables that are never referenced.
    pub fn unused_variables(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|(_, entry)| !entry.used)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract::extract;

    fn build(text: &str) -> SymbolTables {
        SymbolTables::build(text, &extract(text), LibraryRegistry::global())
    }

    #[test]
    fn test_declared_and_used() {
        let tables = build("let x = 5\nlet y = x + 1\nshow y");
        assert!(tables.variable("x").unwrap().used);
        assert!(tables.variable("y").unwrap().used);
        assert_eq!(tables.variable_references["x"], vec![Span { line: 1, start: 8, end: 9 }]);
    }

    #[test]
    fn test_unused_variable() {
        let tables = build("take name = \"name\"\nshow \"name\"\n# name");
        assert!(!tables.variable("name").unwrap().used);
        assert_eq!(tables.unused_variables(), vec!["name"]);
    }

    #[test]
    fn test_redeclaration_resets_usage() {
        let tables = build("let x = 1\nshow x\nlet x = 2");
        let entry = tables.variable("x").unwrap();
        assert_eq!(entry.span.line, 2);
        assert!(!entry.used);

        let tables = build("let x = 1\nshow x\nlet x = 2\nshow x");
        assert!(tables.variable("x").unwrap().used);
        assert_eq!(tables.variable_references["x"].len(), 1);
    }

    #[test]
    fn test_redeclaration_initializer_reads_previous_binding() {
        let tables = build("let count = 1\nshow count\nlet count = count + 1\n");
        let entry = tables.variable("count").unwrap();
        assert_eq!(entry.span.line, 2);
        assert!(!entry.used);
        assert!(!tables.variable_references.contains_key("count"));

        assert!(!build("let x = 1\nhold x = x > 0").variable("x").unwrap().used);
        assert!(build("let x = 1\nlet x = x + 1\nshow x").variable("x").unwrap().used);
    }

    #[test]
    fn test_member_access_and_call_heads_are_not_uses() {
        let tables = build("let push = 1\nlet v = obj.push\narrlib::push(a, 1)");
        assert!(!tables.variable("push").unwrap().used);
    }

    #[test]
    fn test_unresolved_bracket_call_is_indexing() {
        let tables = build("list items = [f]\nput i = 0\nitems[i](3)");
        assert!(tables.variable("items").unwrap().used);
        assert!(tables.variable("i").unwrap().used);
    }

    #[test]
    fn test_library_names_are_not_variables() {
        let tables = build("put strlib = 1\nshow StrLib");
        assert!(!tables.variable("strlib").unwrap().used);
    }

    #[test]
    fn test_libraries_marked_by_calls() {
        let tables = build("lib ArrLib\nlib strlib\narrlib::push(a, 1)\nARRLIB[pop](a)");
        let arrlib = tables.library("arrlib").unwrap();
        assert!(arrlib.used);
        assert_eq!(arrlib.span, Span { line: 0, start: 4, end: 10 });
        assert!(!tables.library("StrLib").unwrap().used);
        assert_eq!(tables.library_references["arrlib"].len(), 2);
    }

    #[test]
    fn test_unknown_import_is_not_tracked() {
        let tables = build("using NotARealLib;");
        assert!(tables.libraries.is_empty());
    }
}
