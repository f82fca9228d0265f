//! Value-shape classification of right-hand-side fragments.
//!
//! This is a heuristic, not a parser. Anything ambiguous classifies to
//! [`Shape::Unknown`], [`Shape::IdentifierReference`] or an unresolved
//! [`Shape::CompoundExpression`], all of which the validator treats as
//! "no opinion".

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::text::{encloses, mask_strings};

/// Best-effort shape of a value expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Numeric,
    Textual,
    Boolean,
    ArrayLike,
    IdentifierReference,
    CompoundExpression,
    Unknown,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Numeric => "numeric",
            Shape::Textual => "textual",
            Shape::Boolean => "boolean",
            Shape::ArrayLike => "array",
            Shape::IdentifierReference => "identifier",
            Shape::CompoundExpression => "expression",
            Shape::Unknown => "unknown",
        }
    }

    /// Whether the validator may compare this shape against a declared kind.
    pub fn has_opinion(&self) -> bool {
        !matches!(
            self,
            Shape::IdentifierReference | Shape::CompoundExpression | Shape::Unknown
        )
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").unwrap();
    static ref DOUBLE_QUOTED_RE: Regex = Regex::new(r#"^"(?:[^"\\]|\\.)*"$"#).unwrap();
    static ref SINGLE_QUOTED_RE: Regex = Regex::new(r"^'(?:[^'\\]|\\.)*'$").unwrap();
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const ARITHMETIC: &[char] = &['+', '-', '*', '/', '%'];

/// Classify a right-hand-side fragment. Surrounding whitespace and one
/// trailing `;` are ignored.
pub fn classify(fragment: &str) -> Shape {
    let fragment = fragment.trim();
    let fragment = fragment.strip_suffix(';').unwrap_or(fragment).trim_end();

    if fragment.is_empty() {
        return Shape::Unknown;
    }
    if NUMBER_RE.is_match(fragment) {
        return Shape::Numeric;
    }
    if DOUBLE_QUOTED_RE.is_match(fragment) || SINGLE_QUOTED_RE.is_match(fragment) {
        return Shape::Textual;
    }
    if fragment == "true" || fragment == "false" {
        return Shape::Boolean;
    }

    let masked = mask_strings(fragment);
    if encloses(&masked, b'[', b']') {
        return Shape::ArrayLike;
    }
    if IDENTIFIER_RE.is_match(fragment) {
        return Shape::IdentifierReference;
    }

    let arithmetic = masked.contains(ARITHMETIC);
    let logical = has_comparison_or_logical(&masked);
    if arithmetic || logical {
        return resolve_compound(&masked, arithmetic, logical);
    }

    Shape::Unknown
}

/// Secondary heuristic for operator expressions.
fn resolve_compound(masked: &str, arithmetic: bool, logical: bool) -> Shape {
    let quoted = masked.contains(['"', '\'']);
    if logical {
        Shape::Boolean
    } else if quoted && masked.contains('+') {
        Shape::Textual
    } else if quoted {
        Shape::CompoundExpression
    } else if arithmetic {
        Shape::Numeric
    } else {
        Shape::CompoundExpression
    }
}

fn has_comparison_or_logical(masked: &str) -> bool {
    masked.contains("==")
        || masked.contains("&&")
        || masked.contains("||")
        || masked.contains(['<', '>', '!'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(classify("5"), Shape::Numeric);
        assert_eq!(classify("-3.25"), Shape::Numeric);
        assert_eq!(classify(".5;"), Shape::Numeric);
        assert_eq!(classify(r#""hello""#), Shape::Textual);
        assert_eq!(classify("'hi there'"), Shape::Textual);
        assert_eq!(classify("true"), Shape::Boolean);
        assert_eq!(classify("false ;"), Shape::Boolean);
        assert_eq!(classify("[1, 2, 3]"), Shape::ArrayLike);
        assert_eq!(classify("[]"), Shape::ArrayLike);
    }

    #[test]
    fn test_identifier_is_no_opinion() {
        assert_eq!(classify("count"), Shape::IdentifierReference);
        assert_eq!(classify("null"), Shape::IdentifierReference);
        assert!(!classify("count").has_opinion());
    }

    #[test]
    fn test_compound_resolution() {
        assert_eq!(classify("a + 1"), Shape::Numeric);
        assert_eq!(classify("a * (b - 2)"), Shape::Numeric);
        assert_eq!(classify("a > 1"), Shape::Boolean);
        assert_eq!(classify("a + 1 >= b"), Shape::Boolean);
        assert_eq!(classify("!done"), Shape::Boolean);
        assert_eq!(classify(r#""a" + name"#), Shape::Textual);
        assert_eq!(classify(r#""a" + "b""#), Shape::Textual);
        assert_eq!(classify(r#""ab" * 2"#), Shape::CompoundExpression);
    }

    #[test]
    fn test_operators_inside_strings_are_ignored() {
        assert_eq!(classify(r#"format("a+b")"#), Shape::Unknown);
        assert_eq!(classify(r#"check("x > y")"#), Shape::Unknown);
    }

    #[test]
    fn test_ambiguous_text_is_unknown() {
        assert_eq!(classify(""), Shape::Unknown);
        assert_eq!(classify("foo(1, 2)"), Shape::Unknown);
        assert_eq!(classify("obj.field"), Shape::Unknown);
        assert_eq!(classify(r#""unterminated"#), Shape::Unknown);
        assert_eq!(classify("[1, 2"), Shape::Unknown);
    }
}
