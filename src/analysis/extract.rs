//! Pattern extraction: source lines → lexical events.
//!
//! Each line is matched by an ordered set of independent matchers:
//!
//! 1. declaration whose initializer is a library call (current form, then
//!    legacy form)
//! 2. bare declaration
//! 3. import
//! 4. bare library calls, current form
//! 5. bare library calls, legacy bracket form
//!
//! The order matters. A bound call's head (`lib::func(` or `Lib[func](`) is
//! recorded as consumed and later matchers skip anything overlapping it, so
//! one construct never yields two unrelated events.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::{Captures, Match, Regex};
use serde::Serialize;

use super::kinds::{declaration_keywords, kind_for_keyword, DeclaredKind, IMPORT_KEYWORDS};
use super::text::{char_column, closing_paren, code_end, is_comment_line, mask_strings};

const IDENT: &str = "[A-Za-z_][A-Za-z0-9_]*";

lazy_static! {
    static ref KEYWORDS: String = declaration_keywords().join("|");
    static ref DECLARATION_CALL_RE: Regex = Regex::new(&format!(
        r"^\s*(?P<kw>{kw})\s+(?P<name>{id})\s*=\s*(?P<lib>{id})::(?P<func>{id})\s*\(",
        kw = *KEYWORDS,
        id = IDENT
    ))
    .unwrap();
    static ref DECLARATION_LEGACY_CALL_RE: Regex = Regex::new(&format!(
        r"^\s*(?P<kw>{kw})\s+(?P<name>{id})\s*=\s*(?P<lib>{id})\[(?P<func>{id})\]\s*\(",
        kw = *KEYWORDS,
        id = IDENT
    ))
    .unwrap();
    static ref DECLARATION_RE: Regex = Regex::new(&format!(
        r"^\s*(?P<kw>{kw})\s+(?P<name>{id})\s*=(?P<init>.*)$",
        kw = *KEYWORDS,
        id = IDENT
    ))
    .unwrap();
    static ref IMPORT_RE: Regex = Regex::new(&format!(
        r"^\s*(?P<kw>{kw})\s+(?P<name>{id})\s*;?\s*$",
        kw = IMPORT_KEYWORDS.join("|"),
        id = IDENT
    ))
    .unwrap();
    static ref CALL_RE: Regex =
        Regex::new(&format!(r"\b(?P<lib>{id})::(?P<func>{id})\s*\(", id = IDENT)).unwrap();
    static ref LEGACY_CALL_RE: Regex =
        Regex::new(&format!(r"\b(?P<lib>{id})\[(?P<func>{id})\]\s*\(", id = IDENT)).unwrap();
}

/// A single-line, end-exclusive range in character columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub(crate) fn from_bytes(line_index: u32, line: &str, bytes: Range<usize>) -> Self {
        Self {
            line: line_index,
            start: char_column(line, bytes.start),
            end: char_column(line, bytes.end),
        }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this span starts at or after the end of `other`.
    pub fn is_past(&self, other: &Span) -> bool {
        (self.line, self.start) >= (other.line, other.end)
    }
}

/// `<keyword> <name> = <initializer>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub keyword: String,
    pub kind: DeclaredKind,
    pub name: String,
    pub name_span: Span,
    /// From the keyword to the end of the code on the line.
    pub statement_span: Span,
    pub initializer: String,
    /// Set when the initializer is a library call.
    pub call: Option<BoundCall>,
}

/// The library call a declaration is initialized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundCall {
    pub library: String,
    pub function: String,
    pub legacy: bool,
    /// The call is the entire initializer, not part of a larger expression.
    pub spans_initializer: bool,
}

/// `lib <name>` / `use <name>` / `using <name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub keyword: String,
    pub name: String,
    pub span: Span,
}

/// `library::function(` or the legacy `Library[function](`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCall {
    pub library: String,
    pub function: String,
    pub library_span: Span,
    pub function_span: Span,
    /// Through the balancing `)` when it is on the line, else through `(`.
    pub call_span: Span,
    /// Argument text between the parentheses, verbatim.
    pub arguments: Option<String>,
    pub legacy: bool,
    /// Part of a declaration-with-call match.
    pub bound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Declaration(Declaration),
    Import(Import),
    LibraryCall(LibraryCall),
}

/// Extract events from every line of `text`, in line order.
pub fn extract(text: &str) -> Vec<Event> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        extract_line(index as u32, line, &mut events);
    }
    events
}

/// Extract events from one line.
pub fn extract_line(index: u32, line: &str, events: &mut Vec<Event>) {
    if is_comment_line(line) {
        return;
    }

    let masked_line = mask_strings(line);
    let masked = &masked_line[..code_end(&masked_line)];
    let mut consumed: Vec<Range<usize>> = Vec::new();

    let declared = match_declaration_call(index, line, masked, &mut consumed, events)
        || match_declaration(index, line, masked, events);

    if !declared {
        match_import(index, line, masked, events);
    }

    let mut calls = Vec::new();
    for (re, legacy) in [(&*CALL_RE, false), (&*LEGACY_CALL_RE, true)] {
        for caps in re.captures_iter(masked) {
            let Some(whole) = caps.get(0) else { continue };
            let head = library_start(&caps)..whole.end();
            if overlaps(&consumed, &head) {
                continue;
            }
            consumed.push(head);
            calls.push(build_call(index, line, masked, &caps, legacy, false));
        }
    }
    calls.sort_by_key(|c| c.library_span.start);
    events.extend(calls.into_iter().map(Event::LibraryCall));
}

fn match_declaration_call(
    index: u32,
    line: &str,
    masked: &str,
    consumed: &mut Vec<Range<usize>>,
    events: &mut Vec<Event>,
) -> bool {
    let (caps, legacy) = if let Some(caps) = DECLARATION_CALL_RE.captures(masked) {
        (caps, false)
    } else if let Some(caps) = DECLARATION_LEGACY_CALL_RE.captures(masked) {
        (caps, true)
    } else {
        return false;
    };
    let (Some(kw), Some(name), Some(whole)) = (caps.name("kw"), caps.name("name"), caps.get(0))
    else {
        return false;
    };
    let Some(kind) = kind_for_keyword(kw.as_str()) else {
        return false;
    };

    let call = build_call(index, line, masked, &caps, legacy, true);
    let init_start = library_start(&caps);
    let spans_initializer = call.arguments.is_some() && {
        let rest_start = byte_of_column(line, call.call_span.end);
        let rest = masked[rest_start..].trim();
        rest.is_empty() || rest == ";"
    };

    events.push(Event::Declaration(Declaration {
        keyword: kw.as_str().to_string(),
        kind,
        name: name.as_str().to_string(),
        name_span: Span::from_bytes(index, line, name.range()),
        statement_span: statement_span(index, line, masked, kw),
        initializer: initializer_text(line, init_start, masked.len()),
        call: Some(BoundCall {
            library: call.library.clone(),
            function: call.function.clone(),
            legacy,
            spans_initializer,
        }),
    }));
    consumed.push(init_start..whole.end());
    events.push(Event::LibraryCall(call));
    true
}

fn match_declaration(index: u32, line: &str, masked: &str, events: &mut Vec<Event>) -> bool {
    let Some(caps) = DECLARATION_RE.captures(masked) else {
        return false;
    };
    let (Some(kw), Some(name), Some(init)) = (caps.name("kw"), caps.name("name"), caps.name("init"))
    else {
        return false;
    };
    // `let x == y` is a comparison, not a declaration
    if init.as_str().starts_with('=') {
        return false;
    }
    let Some(kind) = kind_for_keyword(kw.as_str()) else {
        return false;
    };

    events.push(Event::Declaration(Declaration {
        keyword: kw.as_str().to_string(),
        kind,
        name: name.as_str().to_string(),
        name_span: Span::from_bytes(index, line, name.range()),
        statement_span: statement_span(index, line, masked, kw),
        initializer: initializer_text(line, init.start(), masked.len()),
        call: None,
    }));
    true
}

fn match_import(index: u32, line: &str, masked: &str, events: &mut Vec<Event>) {
    let Some(caps) = IMPORT_RE.captures(masked) else {
        return;
    };
    if let (Some(kw), Some(name)) = (caps.name("kw"), caps.name("name")) {
        events.push(Event::Import(Import {
            keyword: kw.as_str().to_string(),
            name: name.as_str().to_string(),
            span: Span::from_bytes(index, line, name.range()),
        }));
    }
}

fn build_call(
    index: u32,
    line: &str,
    masked: &str,
    caps: &Captures<'_>,
    legacy: bool,
    bound: bool,
) -> LibraryCall {
    let lib = caps.name("lib");
    let func = caps.name("func");
    let open = caps.get(0).map(|m| m.end() - 1).unwrap_or(0);
    let start = library_start(caps);
    let close = closing_paren(masked, open);

    LibraryCall {
        library: text_of(lib),
        function: text_of(func),
        library_span: Span::from_bytes(index, line, lib.map(|m| m.range()).unwrap_or(0..0)),
        function_span: Span::from_bytes(index, line, func.map(|m| m.range()).unwrap_or(0..0)),
        call_span: Span::from_bytes(index, line, start..close.map(|c| c + 1).unwrap_or(open + 1)),
        arguments: close.map(|c| line[open + 1..c].to_string()),
        legacy,
        bound,
    }
}

fn library_start(caps: &Captures<'_>) -> usize {
    caps.name("lib").map(|m| m.start()).unwrap_or(0)
}

fn text_of(m: Option<Match<'_>>) -> String {
    m.map(|m| m.as_str().to_string()).unwrap_or_default()
}

fn statement_span(index: u32, line: &str, masked: &str, kw: Match<'_>) -> Span {
    Span::from_bytes(index, line, kw.start()..masked.trim_end().len())
}

fn initializer_text(line: &str, start: usize, end: usize) -> String {
    let text = line[start..end].trim();
    text.strip_suffix(';').unwrap_or(text).trim_end().to_string()
}

fn byte_of_column(line: &str, column: u32) -> usize {
    super::text::byte_index(line, column).unwrap_or(line.len())
}

fn overlaps(consumed: &[Range<usize>], range: &Range<usize>) -> bool {
    consumed
        .iter()
        .any(|c| range.start < c.end && c.start < range.end)
}
