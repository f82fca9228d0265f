//! Completion hints for a cursor position.
//!
//! Best effort, like everything else here: the line up to the cursor is
//! matched against a few shapes and the registry fills in the candidates.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::diagnostics::Position;
use super::extract::{extract, Event};
use super::kinds::{declaration_keywords, kind_for_keyword, IMPORT_KEYWORDS};
use super::text::{byte_index, is_comment_line, mask_strings};
use crate::registry::{Library, LibraryRegistry};

lazy_static! {
    static ref CURRENT_HEAD_RE: Regex = Regex::new(r"(\w+)::(\w*)$").unwrap();
    static ref LEGACY_HEAD_RE: Regex = Regex::new(r"(\w+)\[(\w*)$").unwrap();
    static ref IMPORT_HEAD_RE: Regex = Regex::new(r"^\s*(?:lib|use|using)\s+(\w*)$").unwrap();
    static ref STATEMENT_START_RE: Regex = Regex::new(r"^\s*(\w*)$").unwrap();
    static ref WORD_TAIL_RE: Regex = Regex::new(r"(?:^|[^\w.])(\w*)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Keyword,
    Library,
    Function,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
}

impl CompletionItem {
    fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            insert_text: None,
        }
    }

    fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn insert(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }
}

/// Candidates for the cursor at `position`, sorted by kind then label.
pub fn complete(text: &str, position: Position, registry: &LibraryRegistry) -> Vec<CompletionItem> {
    let Some(line) = text.lines().nth(position.line as usize).or_else(|| {
        // cursor on the empty last line
        (position.line as usize == text.lines().count()).then_some("")
    }) else {
        return Vec::new();
    };
    let Some(cursor) = byte_index(line, position.character) else {
        return Vec::new();
    };
    let prefix = &line[..cursor];
    if is_comment_line(prefix) || inside_string(prefix) {
        return Vec::new();
    }

    let mut items = if let Some(caps) = CURRENT_HEAD_RE.captures(prefix) {
        registry
            .resolve(&caps[1])
            .map(|lib| functions(lib, &caps[2]))
            .unwrap_or_default()
    } else if let Some(caps) = LEGACY_HEAD_RE.captures(prefix) {
        registry
            .resolve(&caps[1])
            .map(|lib| functions(lib, &caps[2]))
            .unwrap_or_default()
    } else if let Some(caps) = IMPORT_HEAD_RE.captures(prefix) {
        libraries(registry, &caps[1])
    } else if let Some(caps) = STATEMENT_START_RE.captures(prefix) {
        keywords(&caps[1])
    } else if let Some(caps) = WORD_TAIL_RE.captures(prefix) {
        let word = &caps[1];
        let mut items = variables(text, position.line, word);
        items.extend(libraries(registry, word));
        items
    } else {
        Vec::new()
    };

    items.sort_by(|a, b| (a.kind, &a.label).cmp(&(b.kind, &b.label)));
    items.dedup_by(|a, b| a.kind == b.kind && a.label == b.label);
    items
}

fn inside_string(prefix: &str) -> bool {
    let masked = mask_strings(prefix);
    let quotes = masked.chars().filter(|c| *c == '"' || *c == '\'').count();
    // a masked unterminated literal leaves an odd number of delimiters
    quotes % 2 == 1
}

fn functions(library: Library, prefix: &str) -> Vec<CompletionItem> {
    library
        .functions
        .iter()
        .filter(|f| f.name.starts_with(prefix))
        .map(|f| {
            let returns = f.returns.map(|r| r.as_str()).unwrap_or("any");
            CompletionItem::new(f.name, CompletionKind::Function)
                .detail(format!("{}::{}() -> {}", library.name, f.name, returns))
                .insert(format!("{}()", f.name))
        })
        .collect()
}

fn libraries(registry: &LibraryRegistry, prefix: &str) -> Vec<CompletionItem> {
    let prefix = prefix.to_ascii_lowercase();
    registry
        .library_names()
        .into_iter()
        .filter(|name| name.starts_with(&prefix))
        .map(|name| CompletionItem::new(name, CompletionKind::Library).detail("library"))
        .collect()
}

fn keywords(prefix: &str) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = declaration_keywords()
        .into_iter()
        .filter(|kw| kw.starts_with(prefix))
        .filter_map(|kw| {
            let kind = kind_for_keyword(kw)?;
            Some(
                CompletionItem::new(kw, CompletionKind::Keyword)
                    .detail(format!("declare a {} variable", kind))
                    .insert(format!("{} ${{1:name}} = ${{2:value}}", kw)),
            )
        })
        .collect();
    items.extend(
        IMPORT_KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(prefix))
            .map(|kw| {
                CompletionItem::new(*kw, CompletionKind::Keyword)
                    .detail("import a library")
                    .insert(format!("{} ${{1:library}}", kw))
            }),
    );
    items
}

/// Variables declared on lines before `line`, last declaration wins.
fn variables(text: &str, line: u32, prefix: &str) -> Vec<CompletionItem> {
    let mut declared = BTreeMap::new();
    for event in extract(text) {
        if let Event::Declaration(decl) = event {
            if decl.name_span.line < line && decl.name.starts_with(prefix) {
                declared.insert(decl.name, decl.kind);
            }
        }
    }
    declared
        .into_iter()
        .map(|(name, kind)| CompletionItem::new(name, CompletionKind::Variable).detail(kind.as_str()))
        .collect()
}
