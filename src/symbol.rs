//! Symbol types - canonical node representation
//!
//! Every language is mapped onto seven node kinds:
//! - `Module`: namespace, file module, Swift target
//! - `Package`: project root, manifest package
//! - `Type`: class, struct, interface, protocol, enum
//! - `Method`: function declared inside a type
//! - `Property`: accessor-backed member (C# property, Swift computed var)
//! - `Function`: free function, exported top-level function
//! - `Field`: data member, module-level constant

use crate::{Error, Result};
use crate::id::SymbolId;
use crate::language::Language;
use crate::location::SourceLocation;
use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Canonical symbol kinds - every adapter maps onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Namespace, file module, build target
    Module,
    /// Project root or manifest package
    Package,
    /// Class, struct, interface, protocol, enum
    Type,
    /// Function declared inside a type (constructors included)
    Method,
    /// Accessor-backed member
    Property,
    /// Free function
    Function,
    /// Data member or module-level value
    Field,
}

impl SymbolKind {
    /// Get the string representation of the symbol kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Package => "package",
            SymbolKind::Type => "type",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Function => "function",
            SymbolKind::Field => "field",
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::Module,
            SymbolKind::Package,
            SymbolKind::Type,
            SymbolKind::Method,
            SymbolKind::Property,
            SymbolKind::Function,
            SymbolKind::Field,
        ]
    }

    /// Containers may be the source of `declares` edges
    pub fn is_container(&self) -> bool {
        matches!(self, SymbolKind::Module | SymbolKind::Package | SymbolKind::Type)
    }

    /// Module-like containers (the targets of `imports` edges)
    pub fn is_namespace(&self) -> bool {
        matches!(self, SymbolKind::Module | SymbolKind::Package)
    }

    /// Executable symbols
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Function)
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "module" | "namespace" | "ns" | "target" => Ok(SymbolKind::Module),
            "package" | "project" => Ok(SymbolKind::Package),
            "type" | "class" | "struct" | "interface" | "protocol" | "enum" | "trait" => Ok(SymbolKind::Type),
            "method" | "constructor" | "ctor" => Ok(SymbolKind::Method),
            "property" | "prop" | "accessor" => Ok(SymbolKind::Property),
            "function" | "fn" | "def" | "func" => Ok(SymbolKind::Function),
            "field" | "variable" | "var" | "const" | "let" => Ok(SymbolKind::Field),
            _ => Err(Error::InvalidKind(format!("Unknown symbol kind: {}", s))),
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared visibility, ordered from least to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Same declaring file or type only
    Private,
    /// Anywhere inside the analyzed project
    Internal,
    /// Exported surface
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        }
    }

    /// Merge rule for partial declarations: the most permissive wins
    pub fn merge(self, other: Visibility) -> Visibility {
        self.max(other)
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "private" | "fileprivate" | "protected" => Ok(Visibility::Private),
            "internal" | "package" => Ok(Visibility::Internal),
            "public" | "open" | "export" | "exported" => Ok(Visibility::Public),
            _ => Err(Error::InvalidKind(format!("Unknown visibility: {}", s))),
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the symbol graph.
///
/// Nodes are created once by the registry and never mutated afterwards.
/// Partial declarations spread over several files share one node and keep
/// every declaring location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique, content-derived identifier
    pub id: SymbolId,
    /// The kind of symbol
    pub kind: SymbolKind,
    /// Local name (the project name for root packages)
    pub name: String,
    /// Full scope-prefixed name
    pub qualified_name: QualifiedName,
    /// Primary declaring file (first in path order)
    pub declaring_file: String,
    /// Every declaring location, sorted
    pub locations: Vec<SourceLocation>,
    pub visibility: Visibility,
    pub language: Language,
    /// Containing node, `None` only for root packages
    pub parent: Option<SymbolId>,
    /// Parameter count for callables when the adapter knows it
    pub arity: Option<u32>,
    /// Declared type of a field/property/function result
    pub type_hint: Option<String>,
}

impl Node {
    /// Whether this node is a project root package
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether one of the declaring locations is in `file`
    pub fn is_declared_in(&self, file: &str) -> bool {
        self.locations.iter().any(|loc| loc.file == file)
    }

    /// Get a short description for display
    pub fn short_description(&self) -> String {
        match self.arity {
            Some(arity) if self.kind.is_callable() => {
                format!("{} {}/{}", self.kind, self.qualified_name, arity)
            }
            _ => format!("{} {}", self.kind, self.qualified_name),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_kind_roundtrip() {
        for kind in SymbolKind::all() {
            let parsed: SymbolKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_symbol_kind_aliases() {
        assert_eq!(SymbolKind::from_str("class").unwrap(), SymbolKind::Type);
        assert_eq!(SymbolKind::from_str("namespace").unwrap(), SymbolKind::Module);
        assert_eq!(SymbolKind::from_str("ctor").unwrap(), SymbolKind::Method);
        assert!(SymbolKind::from_str("macro").is_err());
    }

    #[test]
    fn test_visibility_merge() {
        assert_eq!(Visibility::Private.merge(Visibility::Public), Visibility::Public);
        assert_eq!(Visibility::Internal.merge(Visibility::Private), Visibility::Internal);
    }

    #[test]
    fn test_containers() {
        assert!(SymbolKind::Type.is_container());
        assert!(SymbolKind::Package.is_namespace());
        assert!(!SymbolKind::Method.is_container());
    }
}
