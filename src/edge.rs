//! Edge types - canonical relationship representation
//!
//! All code relationships reduce to six edge kinds:
//! - `Declares`: container → declared symbol
//! - `References`: symbol → symbol (any non-call usage)
//! - `Calls`: callable/module → callable (constructors included)
//! - `Imports`: module/package → module/package or imported symbol
//! - `Inherits`: type → base type
//! - `Implements`: type → interface/protocol
//!
//! Every non-`Declares` edge targets either a node or an explicit
//! [`UnresolvedTarget`] carrying the reason; there are no silent dangling ids.

use crate::id::SymbolId;
use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Canonical edge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Container declares a symbol (namespace → class, class → method)
    Declares,
    /// Symbol references another symbol (any usage)
    References,
    /// Symbol calls a callable
    Calls,
    /// Module imports a module, package or exported symbol
    Imports,
    /// Type extends another type
    Inherits,
    /// Type implements an interface
    Implements,
}

impl EdgeKind {
    /// Get the string representation of the edge kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Declares => "declares",
            EdgeKind::References => "references",
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
            EdgeKind::Inherits => "inherits",
            EdgeKind::Implements => "implements",
        }
    }

    /// Get all edge kinds
    pub fn all() -> &'static [EdgeKind] {
        &[
            EdgeKind::Declares,
            EdgeKind::References,
            EdgeKind::Calls,
            EdgeKind::Imports,
            EdgeKind::Inherits,
            EdgeKind::Implements,
        ]
    }

    /// Check if this edge kind implies a dependency relationship
    pub fn is_dependency(&self) -> bool {
        !matches!(self, EdgeKind::Declares)
    }

    /// Edge kinds that participate in call-cycle detection
    pub fn is_call_like(&self) -> bool {
        matches!(self, EdgeKind::Calls | EdgeKind::References)
    }

    /// Edge kinds describing the type hierarchy
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, EdgeKind::Inherits | EdgeKind::Implements)
    }
}

impl FromStr for EdgeKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "declares" | "declare" | "defines" => Ok(EdgeKind::Declares),
            "references" | "reference" | "ref" | "uses" => Ok(EdgeKind::References),
            "calls" | "call" => Ok(EdgeKind::Calls),
            "imports" | "import" => Ok(EdgeKind::Imports),
            "inherits" | "inherit" | "extends" => Ok(EdgeKind::Inherits),
            "implements" | "implement" | "conforms" => Ok(EdgeKind::Implements),
            _ => Err(crate::Error::InvalidKind(format!("Unknown edge kind: {}", s))),
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a usage could not be bound to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Nothing in the analyzed set and no declared dependency matches
    NotFound,
    /// Several candidates match with equal specificity
    AmbiguousMultipleCandidates,
    /// The name belongs to a declared dependency outside the analyzed set
    ExternalDependency,
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedReason::NotFound => "not_found",
            UnresolvedReason::AmbiguousMultipleCandidates => "ambiguous_multiple_candidates",
            UnresolvedReason::ExternalDependency => "external_dependency",
        }
    }
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The target of an edge that could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnresolvedTarget {
    /// The target expression as written at the use site
    pub raw_name: String,
    pub reason: UnresolvedReason,
    /// Surfaced candidates for external disambiguation (ambiguous only)
    pub candidates: Vec<SymbolId>,
}

impl UnresolvedTarget {
    pub fn new(raw_name: impl Into<String>, reason: UnresolvedReason) -> Self {
        Self {
            raw_name: raw_name.into(),
            reason,
            candidates: Vec::new(),
        }
    }

    pub fn ambiguous(raw_name: impl Into<String>, mut candidates: Vec<SymbolId>) -> Self {
        candidates.sort();
        candidates.dedup();
        Self {
            raw_name: raw_name.into(),
            reason: UnresolvedReason::AmbiguousMultipleCandidates,
            candidates,
        }
    }
}

/// Where an edge points.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeTarget {
    Node(SymbolId),
    Unresolved(UnresolvedTarget),
}

impl EdgeTarget {
    /// The target node id, if resolved
    pub fn node(&self) -> Option<SymbolId> {
        match self {
            EdgeTarget::Node(id) => Some(*id),
            EdgeTarget::Unresolved(_) => None,
        }
    }

    pub fn unresolved(&self) -> Option<&UnresolvedTarget> {
        match self {
            EdgeTarget::Node(_) => None,
            EdgeTarget::Unresolved(target) => Some(target),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, EdgeTarget::Node(_))
    }
}

/// An edge in the symbol graph.
///
/// Field order is the sort order used for deterministic output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id
    pub source: SymbolId,
    /// Type of relationship
    pub kind: EdgeKind,
    /// Use site (declaration site for `Declares`)
    pub location: SourceLocation,
    pub target: EdgeTarget,
    /// The target is private and the use site is outside its file/type
    pub visibility_violation: bool,
}

impl Edge {
    /// Create an edge to a resolved node
    pub fn new(kind: EdgeKind, source: SymbolId, target: SymbolId, location: SourceLocation) -> Self {
        Self {
            source,
            kind,
            location,
            target: EdgeTarget::Node(target),
            visibility_violation: false,
        }
    }

    /// Create an edge to an unresolved target
    pub fn unresolved(
        kind: EdgeKind,
        source: SymbolId,
        target: UnresolvedTarget,
        location: SourceLocation,
    ) -> Self {
        Self {
            source,
            kind,
            location,
            target: EdgeTarget::Unresolved(target),
            visibility_violation: false,
        }
    }

    /// Flag the edge as crossing a private boundary
    pub fn with_visibility_violation(mut self, violation: bool) -> Self {
        self.visibility_violation = violation;
        self
    }

    /// Target node id, if resolved
    pub fn target_id(&self) -> Option<SymbolId> {
        self.target.node()
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_resolved()
    }
}
