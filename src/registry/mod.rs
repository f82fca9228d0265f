//! Library capability registry.
//!
//! Static catalog of the Razen standard libraries: which functions each
//! library exposes and, for a subset of them, what shape of value they
//! return. The catalog is process-wide read-only data; the analyzer receives
//! a reference to a [`LibraryRegistry`] instead of reaching for globals.
//!
//! Library names are matched case-insensitively against their canonical
//! lowercase spelling, so `ArrLib`, `ARRLIB` and `arrlib` all resolve to the
//! same entry.

mod catalog;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::analysis::DeclaredKind;

pub use catalog::CATALOG;

/// Shape of the value a library function returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnShape {
    Number,
    Text,
    Boolean,
    Array,
    Object,
}

impl ReturnShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnShape::Number => "number",
            ReturnShape::Text => "text",
            ReturnShape::Boolean => "boolean",
            ReturnShape::Array => "array",
            ReturnShape::Object => "object",
        }
    }

    /// Declared kind a variable initialized from this shape should use.
    pub fn recommended_kind(&self) -> DeclaredKind {
        match self {
            ReturnShape::Number => DeclaredKind::Numeric,
            ReturnShape::Text => DeclaredKind::Textual,
            ReturnShape::Boolean => DeclaredKind::Boolean,
            ReturnShape::Array | ReturnShape::Object => DeclaredKind::Collection,
        }
    }
}

impl std::fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function exposed by a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub returns: Option<ReturnShape>,
}

/// A library with a canonical name and its closed function set.
#[derive(Debug, Clone, Copy)]
pub struct Library {
    pub name: &'static str,
    pub functions: &'static [FunctionSpec],
}

impl Library {
    /// Look up a function by exact name.
    pub fn function(&self, name: &str) -> Option<&'static FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.function(name).is_some()
    }

    /// Function names in catalog order.
    pub fn function_names(&self) -> Vec<&'static str> {
        self.functions.iter().map(|f| f.name).collect()
    }
}

type Catalog = phf::Map<&'static str, &'static [FunctionSpec]>;

/// Read-only view over a library catalog.
#[derive(Debug, Clone, Copy)]
pub struct LibraryRegistry {
    catalog: &'static Catalog,
}

static GLOBAL: OnceCell<LibraryRegistry> = OnceCell::new();

impl LibraryRegistry {
    /// Wrap a catalog. Keys must already be lowercase.
    pub const fn new(catalog: &'static Catalog) -> Self {
        Self { catalog }
    }

    /// The process-wide registry over the built-in catalog.
    pub fn global() -> &'static LibraryRegistry {
        GLOBAL.get_or_init(|| {
            tracing::debug!(libraries = CATALOG.len(), "library registry initialized");
            LibraryRegistry::new(&CATALOG)
        })
    }

    /// Resolve a library name as written in source to its catalog entry.
    pub fn resolve(&self, name: &str) -> Option<Library> {
        let lower = name.to_ascii_lowercase();
        self.catalog
            .get_entry(lower.as_str())
            .map(|(name, functions)| Library {
                name: *name,
                functions: *functions,
            })
    }

    /// Canonical spelling for a library name, if it is registered.
    pub fn canonical_name(&self, name: &str) -> Option<&'static str> {
        self.resolve(name).map(|lib| lib.name)
    }

    pub fn is_library(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// All canonical library names, sorted.
    pub fn library_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.catalog.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        *Self::global()
    }
}
