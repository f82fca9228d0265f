//! Declaration keywords and the kinds they commit a variable to.

use phf::phf_map;
use serde::{Deserialize, Serialize};

use super::shape::Shape;

/// Kind a declaration keyword commits its variable to.
///
/// The derived-operation kinds (`Sum`, `Concatenation`, ...) each imply one
/// of the base kinds; see [`DeclaredKind::base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclaredKind {
    Numeric,
    Textual,
    Boolean,
    Collection,
    Any,
    Sum,
    Difference,
    Product,
    Quotient,
    Remainder,
    Length,
    Concatenation,
    Slice,
}

impl DeclaredKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredKind::Numeric => "numeric",
            DeclaredKind::Textual => "textual",
            DeclaredKind::Boolean => "boolean",
            DeclaredKind::Collection => "collection",
            DeclaredKind::Any => "any",
            DeclaredKind::Sum => "sum-like",
            DeclaredKind::Difference => "difference-like",
            DeclaredKind::Product => "product-like",
            DeclaredKind::Quotient => "quotient-like",
            DeclaredKind::Remainder => "remainder-like",
            DeclaredKind::Length => "length-like",
            DeclaredKind::Concatenation => "concatenation-like",
            DeclaredKind::Slice => "slice-like",
        }
    }

    /// The base kind this kind implies.
    pub fn base(&self) -> DeclaredKind {
        match self {
            DeclaredKind::Numeric
            | DeclaredKind::Sum
            | DeclaredKind::Difference
            | DeclaredKind::Product
            | DeclaredKind::Quotient
            | DeclaredKind::Remainder
            | DeclaredKind::Length => DeclaredKind::Numeric,
            DeclaredKind::Textual | DeclaredKind::Concatenation | DeclaredKind::Slice => {
                DeclaredKind::Textual
            }
            DeclaredKind::Boolean => DeclaredKind::Boolean,
            DeclaredKind::Collection => DeclaredKind::Collection,
            DeclaredKind::Any => DeclaredKind::Any,
        }
    }

    pub fn is_any(&self) -> bool {
        self.base() == DeclaredKind::Any
    }

    /// Whether a value of `shape` fits this kind.
    ///
    /// Returns `None` when there is no opinion: the universal kind, or a shape
    /// the classifier could not pin down.
    pub fn accepts(&self, shape: Shape) -> Option<bool> {
        let expected = match self.base() {
            DeclaredKind::Any => return None,
            base => base,
        };
        let actual = match shape {
            Shape::Numeric => DeclaredKind::Numeric,
            Shape::Textual => DeclaredKind::Textual,
            Shape::Boolean => DeclaredKind::Boolean,
            Shape::ArrayLike => DeclaredKind::Collection,
            Shape::IdentifierReference | Shape::CompoundExpression | Shape::Unknown => {
                return None
            }
        };
        Some(expected == actual)
    }

    /// Keyword that declares a variable of this kind's base.
    pub fn recommended_keyword(&self) -> &'static str {
        match self.base() {
            DeclaredKind::Numeric => "let",
            DeclaredKind::Textual => "take",
            DeclaredKind::Boolean => "hold",
            DeclaredKind::Collection => "list",
            _ => "put",
        }
    }
}

impl std::fmt::Display for DeclaredKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declaration keyword → declared kind.
pub static DECLARATION_KEYWORDS: phf::Map<&'static str, DeclaredKind> = phf_map! {
    "let" => DeclaredKind::Numeric,
    "take" => DeclaredKind::Textual,
    "hold" => DeclaredKind::Boolean,
    "put" => DeclaredKind::Any,
    "sum" => DeclaredKind::Sum,
    "diff" => DeclaredKind::Difference,
    "prod" => DeclaredKind::Product,
    "div" => DeclaredKind::Quotient,
    "mod" => DeclaredKind::Remainder,
    "len" => DeclaredKind::Length,
    "text" => DeclaredKind::Textual,
    "concat" => DeclaredKind::Concatenation,
    "slice" => DeclaredKind::Slice,
    "list" => DeclaredKind::Collection,
    "arr" => DeclaredKind::Collection,
    "map" => DeclaredKind::Collection,
    "store" => DeclaredKind::Any,
    "box" => DeclaredKind::Any,
    "ref" => DeclaredKind::Any,
};

/// Keywords that introduce a library import.
pub const IMPORT_KEYWORDS: &[&str] = &["lib", "use", "using"];

pub fn kind_for_keyword(keyword: &str) -> Option<DeclaredKind> {
    DECLARATION_KEYWORDS.get(keyword).copied()
}

/// Declaration keywords, longest first so regex alternation prefers them.
pub fn declaration_keywords() -> Vec<&'static str> {
    let mut keywords: Vec<&'static str> = DECLARATION_KEYWORDS.keys().copied().collect();
    keywords.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(kind_for_keyword("let"), Some(DeclaredKind::Numeric));
        assert_eq!(kind_for_keyword("take"), Some(DeclaredKind::Textual));
        assert_eq!(kind_for_keyword("hold"), Some(DeclaredKind::Boolean));
        assert_eq!(kind_for_keyword("put"), Some(DeclaredKind::Any));
        assert_eq!(kind_for_keyword("var"), None);
    }

    #[test]
    fn test_derived_kinds_imply_base() {
        assert_eq!(DeclaredKind::Sum.base(), DeclaredKind::Numeric);
        assert_eq!(DeclaredKind::Length.base(), DeclaredKind::Numeric);
        assert_eq!(DeclaredKind::Concatenation.base(), DeclaredKind::Textual);
        assert!(DeclaredKind::Any.is_any());
        assert!(!DeclaredKind::Sum.is_any());
    }

    #[test]
    fn test_accepts() {
        assert_eq!(DeclaredKind::Numeric.accepts(Shape::Numeric), Some(true));
        assert_eq!(DeclaredKind::Sum.accepts(Shape::Numeric), Some(true));
        assert_eq!(DeclaredKind::Numeric.accepts(Shape::Textual), Some(false));
        assert_eq!(DeclaredKind::Collection.accepts(Shape::ArrayLike), Some(true));
        assert_eq!(DeclaredKind::Numeric.accepts(Shape::IdentifierReference), None);
        assert_eq!(DeclaredKind::Numeric.accepts(Shape::Unknown), None);
        assert_eq!(DeclaredKind::Any.accepts(Shape::Textual), None);
    }

    #[test]
    fn test_keywords_longest_first() {
        let keywords = declaration_keywords();
        assert_eq!(keywords.len(), DECLARATION_KEYWORDS.len());
        assert!(keywords.windows(2).all(|w| w[0].len() >= w[1].len()));
    }
}
