//! Build diagnostics
//!
//! Input defects, resolution gaps and policy violations never abort a build;
//! they are collected here alongside the graph, each with a source location.

use crate::edge::UnresolvedReason;
use crate::id::SymbolId;
use crate::location::SourceLocation;
use crate::name::QualifiedName;
use crate::symbol::SymbolKind;
use serde::Serialize;
use std::fmt;

/// How loudly a diagnostic should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A non-fatal finding of the build.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The adapter produced nothing for this file
    Unparsed {
        location: SourceLocation,
        message: String,
    },
    /// The adapter met a construct it cannot map onto a canonical kind
    CoverageGap {
        location: SourceLocation,
        construct: String,
    },
    /// Two declarations in one file claim the same qualified name and kind
    DuplicateDeclaration {
        location: SourceLocation,
        qualified_name: QualifiedName,
        kind: SymbolKind,
        first: SourceLocation,
    },
    /// A usage bound to nothing (not found or external)
    Unresolved {
        location: SourceLocation,
        raw_name: String,
        reason: UnresolvedReason,
        source: SymbolId,
    },
    /// A usage matching several candidates
    Ambiguous {
        location: SourceLocation,
        raw_name: String,
        candidates: Vec<SymbolId>,
        source: SymbolId,
    },
    /// A private symbol used from outside its file/type
    VisibilityViolation {
        location: SourceLocation,
        target: SymbolId,
        target_name: QualifiedName,
        source: SymbolId,
    },
    /// Modules importing each other
    ImportCycle {
        location: SourceLocation,
        members: Vec<QualifiedName>,
    },
}

impl Diagnostic {
    /// The source location this diagnostic points at
    pub fn location(&self) -> &SourceLocation {
        match self {
            Diagnostic::Unparsed { location, .. }
            | Diagnostic::CoverageGap { location, .. }
            | Diagnostic::DuplicateDeclaration { location, .. }
            | Diagnostic::Unresolved { location, .. }
            | Diagnostic::Ambiguous { location, .. }
            | Diagnostic::VisibilityViolation { location, .. }
            | Diagnostic::ImportCycle { location, .. } => location,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::CoverageGap { .. } => Severity::Info,
            Diagnostic::Unresolved { reason, .. } => match reason {
                UnresolvedReason::ExternalDependency => Severity::Info,
                _ => Severity::Warning,
            },
            Diagnostic::Ambiguous { .. } | Diagnostic::ImportCycle { .. } => Severity::Warning,
            Diagnostic::Unparsed { .. }
            | Diagnostic::DuplicateDeclaration { .. }
            | Diagnostic::VisibilityViolation { .. } => Severity::Error,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::Unparsed { .. } => "unparsed",
            Diagnostic::CoverageGap { .. } => "coverage_gap",
            Diagnostic::DuplicateDeclaration { .. } => "duplicate_declaration",
            Diagnostic::Unresolved { reason, .. } => reason.as_str(),
            Diagnostic::Ambiguous { .. } => "ambiguous_multiple_candidates",
            Diagnostic::VisibilityViolation { .. } => "visibility_violation",
            Diagnostic::ImportCycle { .. } => "import_cycle",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.location())?;
        match self {
            Diagnostic::Unparsed { message, .. } => write!(f, "file not parsed: {}", message),
            Diagnostic::CoverageGap { construct, .. } => {
                write!(f, "unsupported construct `{}`", construct)
            }
            Diagnostic::DuplicateDeclaration { qualified_name, kind, first, .. } => {
                write!(f, "duplicate {} `{}` (first declared at {})", kind, qualified_name, first)
            }
            Diagnostic::Unresolved { raw_name, reason, .. } => {
                write!(f, "unresolved `{}` ({})", raw_name, reason)
            }
            Diagnostic::Ambiguous { raw_name, candidates, .. } => {
                write!(f, "ambiguous `{}` ({} candidates)", raw_name, candidates.len())
            }
            Diagnostic::VisibilityViolation { target_name, .. } => {
                write!(f, "private `{}` used outside its file or type", target_name)
            }
            Diagnostic::ImportCycle { members, .. } => {
                let names: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "import cycle: {}", names.join(" -> "))
            }
        }
    }
}

/// Count diagnostics per severity
pub fn count_by_severity(diagnostics: &[Diagnostic]) -> (usize, usize, usize) {
    diagnostics.iter().fold((0, 0, 0), |(info, warn, err), d| match d.severity() {
        Severity::Info => (info + 1, warn, err),
        Severity::Warning => (info, warn + 1, err),
        Severity::Error => (info, warn, err + 1),
    })
}
