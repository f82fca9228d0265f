//! Quick fixes for diagnostics that carry a fix code.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::diagnostics::{Diagnostic, FixCode, Position, Range};
use super::text::byte_index;
use super::validate::current_form;

lazy_static! {
    static ref LEGACY_CALL_RE: Regex = Regex::new(r"^(\w+)\[(\w+)\]\s*\((.*)\)$").unwrap();
}

pub const QUICKFIX_KIND: &str = "quickfix";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// A single-edit refactoring for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAction {
    pub title: String,
    pub kind: String,
    pub document: String,
    pub diagnostics: Vec<Diagnostic>,
    pub edit: TextEdit,
}

/// Propose a fix for `diagnostic` against the current `text`.
///
/// The range is re-read from `text`, so a diagnostic from an older pass whose
/// range no longer covers a legacy call yields nothing.
pub fn propose(document: &str, text: &str, diagnostic: &Diagnostic) -> Option<CodeAction> {
    match diagnostic.fix_code? {
        FixCode::DeprecatedCallForm => {
            let slice = slice_range(text, &diagnostic.range)?;
            let caps = LEGACY_CALL_RE.captures(slice)?;
            let replacement = current_form(&caps[1], &caps[2], Some(&caps[3]));
            Some(CodeAction {
                title: format!("Replace with '{}'", replacement),
                kind: QUICKFIX_KIND.to_string(),
                document: document.to_string(),
                diagnostics: vec![diagnostic.clone()],
                edit: TextEdit {
                    range: diagnostic.range,
                    new_text: replacement,
                },
            })
        }
    }
}

/// Text covered by a single-line range.
fn slice_range<'a>(text: &'a str, range: &Range) -> Option<&'a str> {
    if range.start.line != range.end.line || range.start.character > range.end.character {
        return None;
    }
    let line = text.lines().nth(range.start.line as usize)?;
    let start = byte_index(line, range.start.character)?;
    let end = byte_index(line, range.end.character)?;
    Some(&line[start..end])
}

/// Apply edits to `text` and return the result with the number of edits
/// applied. Edits overlapping an already applied one are skipped; line
/// endings are preserved.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> (String, usize) {
    let mut resolved: Vec<(usize, usize, &str)> = edits
        .iter()
        .filter_map(|edit| {
            let start = offset_of(text, edit.range.start)?;
            let end = offset_of(text, edit.range.end)?;
            (start <= end).then_some((start, end, edit.new_text.as_str()))
        })
        .collect();
    resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut out = text.to_string();
    let mut floor = usize::MAX;
    let mut applied = 0;
    for (start, end, new_text) in resolved {
        if end > floor {
            continue;
        }
        out.replace_range(start..end, new_text);
        floor = start;
        applied += 1;
    }
    (out, applied)
}

fn offset_of(text: &str, position: Position) -> Option<usize> {
    let mut line_start = 0;
    for (index, segment) in text.split('\n').enumerate() {
        if index == position.line as usize {
            let line = segment.strip_suffix('\r').unwrap_or(segment);
            return byte_index(line, position.character).map(|b| line_start + b);
        }
        line_start += segment.len() + 1;
    }
    None
}
