//! Canonical AST Adapter Framework
//!
//! Each language walks its tree-sitter syntax tree and emits canonical
//! declarations and usages. The core engine never sees language-specific logic
//! past this boundary.

pub mod framework;
pub mod python;
pub mod typescript;

pub use framework::{
    AdapterRegistry, DeclarationKind, Extraction, ImportSpec, ImportedName, LanguageAdapter,
    LocalBinding, RawDeclaration, RawUsage, SourceFile, UsageKind, check_extracted, default_registry, grammar_for,
    parse_source,
};
pub use python::PythonAdapter;
pub use typescript::TypeScriptAdapter;
