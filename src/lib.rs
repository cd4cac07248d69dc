//! # symgraph - Multi-language static symbol graph engine
//!
//! Builds one unified graph of declarations and references out of
//! heterogeneous source trees, independent of the language that produced them.
//!
//! symgraph provides:
//! - A canonical declaration/usage model fed by pluggable language adapters
//! - A symbol registry with stable, content-derived symbol ids
//! - A reference resolver with per-language scope strategies
//! - An immutable assembled graph with structural queries (callers, callees,
//!   dependents, cycles, diffs)
//!
//! Data flows one way: adapters → registry → resolver → assembler.

pub mod language;
pub mod location;
pub mod name;
pub mod id;
pub mod symbol;
pub mod edge;
pub mod diagnostics;
pub mod config;
pub mod manifest;
pub mod adapter;
pub mod registry;
pub mod scope;
pub mod resolver;
pub mod graph;
pub mod pipeline;

// Re-exports for convenient access
pub use language::Language;
pub use location::SourceLocation;
pub use name::QualifiedName;
pub use id::SymbolId;
pub use symbol::{Node, SymbolKind, Visibility};
pub use edge::{Edge, EdgeKind, EdgeTarget, UnresolvedReason, UnresolvedTarget};
pub use diagnostics::{Diagnostic, Severity};
pub use config::EngineConfig;
pub use manifest::{DependencyManifest, ManifestUnit};
pub use registry::{DuplicateDeclarationError, Registry, SymbolTable};
pub use graph::Graph;
pub use pipeline::{BuildOutput, CancelToken, Phase, Pipeline};

/// Result type alias for symgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for symgraph operations.
///
/// Only [`Error::Structural`] and [`Error::Cancelled`] abort a build; adapter
/// failures are isolated to their file and everything else is reported as a
/// [`Diagnostic`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid symbol id: {0}")]
    InvalidId(String),

    #[error("Invalid kind: {0}")]
    InvalidKind(String),

    #[error("Adapter error in {path}: {message}")]
    Adapter { path: String, message: String },

    #[error("No adapter registered for language {0}")]
    NoAdapter(Language),

    #[error(transparent)]
    Duplicate(#[from] DuplicateDeclarationError),

    #[error("Structural defect: {kind} edge at {location} names unregistered symbol {missing}")]
    Structural {
        kind: EdgeKind,
        missing: SymbolId,
        location: SourceLocation,
    },

    #[error("Build cancelled during {phase} phase")]
    Cancelled { phase: Phase },

    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an adapter error for a file
    pub fn adapter(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Adapter {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole build
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Structural { .. } | Error::Cancelled { .. } | Error::Pool(_))
    }
}
