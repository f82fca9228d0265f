//! Usage and type validation of extracted events against the registry.

use super::extract::{Declaration, Event, Import, LibraryCall, Span};
use super::kinds::DeclaredKind;
use super::shape::{classify, Shape};
use crate::registry::{LibraryRegistry, ReturnShape};

/// A problem found by the validator, before it becomes a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    UnknownImport {
        name: String,
        span: Span,
        known: Vec<&'static str>,
    },
    UnknownLibrary {
        library: String,
        span: Span,
        known: Vec<&'static str>,
    },
    UnknownFunction {
        library: &'static str,
        function: String,
        span: Span,
        allowed: Vec<&'static str>,
    },
    KindMismatch {
        name: String,
        keyword: String,
        kind: DeclaredKind,
        shape: Shape,
        span: Span,
    },
    ReturnKindMismatch {
        name: String,
        keyword: String,
        kind: DeclaredKind,
        library: &'static str,
        function: String,
        returns: ReturnShape,
        span: Span,
    },
    DeprecatedCall {
        library: String,
        function: String,
        replacement: String,
        span: Span,
    },
}

impl Finding {
    pub fn span(&self) -> Span {
        match self {
            Finding::UnknownImport { span, .. }
            | Finding::UnknownLibrary { span, .. }
            | Finding::UnknownFunction { span, .. }
            | Finding::KindMismatch { span, .. }
            | Finding::ReturnKindMismatch { span, .. }
            | Finding::DeprecatedCall { span, .. } => *span,
        }
    }
}

/// Validate every event. Never fails; anything ambiguous yields no finding.
pub fn validate(events: &[Event], registry: &LibraryRegistry) -> Vec<Finding> {
    let mut findings = Vec::new();
    for event in events {
        match event {
            Event::Import(import) => check_import(import, registry, &mut findings),
            Event::LibraryCall(call) => check_call(call, registry, &mut findings),
            Event::Declaration(decl) => check_declaration(decl, registry, &mut findings),
        }
    }
    findings
}

fn check_import(import: &Import, registry: &LibraryRegistry, findings: &mut Vec<Finding>) {
    if !registry.is_library(&import.name) {
        findings.push(Finding::UnknownImport {
            name: import.name.clone(),
            span: import.span,
            known: registry.library_names(),
        });
    }
}

fn check_call(call: &LibraryCall, registry: &LibraryRegistry, findings: &mut Vec<Finding>) {
    let Some(library) = registry.resolve(&call.library) else {
        // `name[index](...)` with an unknown name is most likely indexing
        if !call.legacy {
            findings.push(Finding::UnknownLibrary {
                library: call.library.clone(),
                span: call.library_span,
                known: registry.library_names(),
            });
        }
        return;
    };

    if !library.has_function(&call.function) {
        findings.push(Finding::UnknownFunction {
            library: library.name,
            function: call.function.clone(),
            span: call.function_span,
            allowed: library.function_names(),
        });
    }

    if call.legacy {
        findings.push(Finding::DeprecatedCall {
            library: call.library.clone(),
            function: call.function.clone(),
            replacement: current_form(library.name, &call.function, call.arguments.as_deref()),
            span: call.call_span,
        });
    }
}

fn check_declaration(decl: &Declaration, registry: &LibraryRegistry, findings: &mut Vec<Finding>) {
    let Some(bound) = &decl.call else {
        let shape = classify(&decl.initializer);
        if decl.kind.accepts(shape) == Some(false) {
            findings.push(Finding::KindMismatch {
                name: decl.name.clone(),
                keyword: decl.keyword.clone(),
                kind: decl.kind,
                shape,
                span: decl.statement_span,
            });
        }
        return;
    };

    if !bound.spans_initializer || decl.kind.is_any() {
        return;
    }
    let Some(library) = registry.resolve(&bound.library) else {
        return;
    };
    let Some(returns) = library.function(&bound.function).and_then(|f| f.returns) else {
        return;
    };
    if decl.kind.base() != returns.recommended_kind().base() {
        findings.push(Finding::ReturnKindMismatch {
            name: decl.name.clone(),
            keyword: decl.keyword.clone(),
            kind: decl.kind,
            library: library.name,
            function: bound.function.clone(),
            returns,
            span: decl.statement_span,
        });
    }
}

/// `library::function(arguments)`; just the head when the call is unbalanced.
pub fn current_form(library: &str, function: &str, arguments: Option<&str>) -> String {
    match arguments {
        Some(args) => format!("{}::{}({})", library.to_ascii_lowercase(), function, args),
        None => format!("{}::{}(", library.to_ascii_lowercase(), function),
    }
}
