//! Diagnostic records and the aggregation of validator findings into them.

use serde::{Deserialize, Serialize};

use super::extract::Span;
use super::validate::Finding;

/// Value of every diagnostic's `source` field.
pub const SOURCE_TAG: &str = "razencheck";

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Stable identifier of the finding class behind a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticRule {
    #[serde(rename = "unknown_import")]
    UnknownImport,
    #[serde(rename = "unknown_library")]
    UnknownLibrary,
    #[serde(rename = "unknown_function")]
    UnknownFunction,
    #[serde(rename = "kind_mismatch")]
    KindMismatch,
    #[serde(rename = "return_kind_mismatch")]
    ReturnKindMismatch,
    #[serde(rename = "deprecated_call")]
    DeprecatedCall,
}

impl DiagnosticRule {
    pub const ALL: [DiagnosticRule; 6] = [
        DiagnosticRule::UnknownImport,
        DiagnosticRule::UnknownLibrary,
        DiagnosticRule::UnknownFunction,
        DiagnosticRule::KindMismatch,
        DiagnosticRule::ReturnKindMismatch,
        DiagnosticRule::DeprecatedCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticRule::UnknownImport => "unknown_import",
            DiagnosticRule::UnknownLibrary => "unknown_library",
            DiagnosticRule::UnknownFunction => "unknown_function",
            DiagnosticRule::KindMismatch => "kind_mismatch",
            DiagnosticRule::ReturnKindMismatch => "return_kind_mismatch",
            DiagnosticRule::DeprecatedCall => "deprecated_call",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.as_str() == s)
    }

    /// One-line description used in SARIF rule metadata.
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticRule::UnknownImport => "Import of a library that is not registered",
            DiagnosticRule::UnknownLibrary => "Call into a library that is not registered",
            DiagnosticRule::UnknownFunction => "Call to a function the library does not expose",
            DiagnosticRule::KindMismatch => "Initializer does not match the declared kind",
            DiagnosticRule::ReturnKindMismatch => {
                "Library call returns a different kind than the declaration"
            }
            DiagnosticRule::DeprecatedCall => "Deprecated bracket call form",
        }
    }
}

impl std::fmt::Display for DiagnosticRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Machine-applicable fix attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixCode {
    #[serde(rename = "deprecated-call-form")]
    DeprecatedCallForm,
}

impl FixCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixCode::DeprecatedCallForm => "deprecated-call-form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Zero-based, end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl From<Span> for Range {
    fn from(span: Span) -> Self {
        Range {
            start: Position {
                line: span.line,
                character: span.start,
            },
            end: Position {
                line: span.line,
                character: span.end,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
    pub source: String,
    #[serde(rename = "code")]
    pub rule: DiagnosticRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_code: Option<FixCode>,
}

impl Diagnostic {
    fn new(span: Span, severity: Severity, rule: DiagnosticRule, message: String) -> Self {
        Self {
            range: span.into(),
            severity,
            message,
            source: SOURCE_TAG.to_string(),
            rule,
            fix_code: None,
        }
    }

    fn with_fix(mut self, fix: FixCode) -> Self {
        self.fix_code = Some(fix);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Convert findings to diagnostics ordered by (line, column, rule).
pub fn aggregate(findings: Vec<Finding>) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = findings.into_iter().map(to_diagnostic).collect();
    diagnostics.sort_by(|a, b| {
        (a.range.start, a.rule, a.range.end).cmp(&(b.range.start, b.rule, b.range.end))
    });
    diagnostics
}

fn to_diagnostic(finding: Finding) -> Diagnostic {
    let span = finding.span();
    match finding {
        Finding::UnknownImport { name, known, .. } => Diagnostic::new(
            span,
            Severity::Warning,
            DiagnosticRule::UnknownImport,
            format!(
                "Unknown library '{}'. Known libraries: {}",
                name,
                known.join(", ")
            ),
        ),
        Finding::UnknownLibrary { library, known, .. } => Diagnostic::new(
            span,
            Severity::Error,
            DiagnosticRule::UnknownLibrary,
            format!(
                "Unknown library '{}'. Known libraries: {}",
                library,
                known.join(", ")
            ),
        ),
        Finding::UnknownFunction {
            library,
            function,
            allowed,
            ..
        } => Diagnostic::new(
            span,
            Severity::Error,
            DiagnosticRule::UnknownFunction,
            format!(
                "Library '{}' has no function '{}'. Available functions: {}",
                library,
                function,
                allowed.join(", ")
            ),
        ),
        Finding::KindMismatch {
            name,
            keyword,
            kind,
            shape,
            ..
        } => Diagnostic::new(
            span,
            Severity::Warning,
            DiagnosticRule::KindMismatch,
            format!(
                "'{}' is declared with '{}' and expects a {} value, but the initializer is {}",
                name,
                keyword,
                kind.base(),
                shape
            ),
        ),
        Finding::ReturnKindMismatch {
            name,
            keyword,
            library,
            function,
            returns,
            ..
        } => Diagnostic::new(
            span,
            Severity::Warning,
            DiagnosticRule::ReturnKindMismatch,
            format!(
                "'{}::{}' returns a {} value; declare '{}' with '{}' instead of '{}'",
                library,
                function,
                returns,
                name,
                returns.recommended_kind().recommended_keyword(),
                keyword
            ),
        ),
        Finding::DeprecatedCall {
            library,
            function,
            replacement,
            ..
        } => Diagnostic::new(
            span,
            Severity::Warning,
            DiagnosticRule::DeprecatedCall,
            format!(
                "'{}[{}](...)' is a deprecated call form; use '{}'",
                library, function, replacement
            ),
        )
        .with_fix(FixCode::DeprecatedCallForm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::kinds::DeclaredKind;
    use crate::analysis::shape::Shape;

    fn span(line: u32, start: u32, end: u32) -> Span {
        Span { line, start, end }
    }

    #[test]
    fn test_rule_round_trip() {
        for rule in DiagnosticRule::ALL {
            assert_eq!(DiagnosticRule::parse(rule.as_str()), Some(rule));
        }
        assert_eq!(DiagnosticRule::parse("nope"), None);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("info".parse::<Severity>().is_err());
    }

    #[test]
    fn test_kind_mismatch_message() {
        let diags = aggregate(vec![Finding::KindMismatch {
            name: "x".to_string(),
            keyword: "let".to_string(),
            kind: DeclaredKind::Numeric,
            shape: Shape::Textual,
            span: span(0, 0, 15),
        }]);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("numeric"));
        assert!(diags[0].message.contains("textual"));
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].source, SOURCE_TAG);
    }

    #[test]
    fn test_ordering() {
        let diags = aggregate(vec![
            Finding::DeprecatedCall {
                library: "ArrLib".to_string(),
                function: "pish".to_string(),
                replacement: "arrlib::pish()".to_string(),
                span: span(1, 0, 14),
            },
            Finding::UnknownImport {
                name: "nope".to_string(),
                span: span(0, 4, 8),
                known: vec!["arrlib"],
            },
            Finding::UnknownFunction {
                library: "arrlib",
                function: "pish".to_string(),
                span: span(1, 7, 11),
                allowed: vec!["push"],
            },
        ]);
        let rules: Vec<_> = diags.iter().map(|d| d.rule).collect();
        assert_eq!(
            rules,
            vec![
                DiagnosticRule::UnknownImport,
                DiagnosticRule::DeprecatedCall,
                DiagnosticRule::UnknownFunction,
            ]
        );
    }

    #[test]
    fn test_wire_shape() {
        let diags = aggregate(vec![Finding::DeprecatedCall {
            library: "ArrLib".to_string(),
            function: "push".to_string(),
            replacement: "arrlib::push(a)".to_string(),
            span: span(2, 1, 16),
        }]);
        let json = serde_json::to_value(&diags[0]).unwrap();
        assert_eq!(json["range"]["start"]["line"], 2);
        assert_eq!(json["range"]["end"]["character"], 16);
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["code"], "deprecated_call");
        assert_eq!(json["fixCode"], "deprecated-call-form");
        assert_eq!(json["source"], "razencheck");

        let back: Diagnostic = serde_json::from_value(json).unwrap();
        assert_eq!(back, diags[0]);
    }
}
