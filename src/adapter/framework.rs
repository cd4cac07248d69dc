//! Core adapter framework
//!
//! Defines the canonical extraction contract every language adapter fills in,
//! plus the registry that routes a parsed file to its adapter.

use crate::{Error, Result};
use crate::language::Language;
use crate::location::SourceLocation;
use crate::name::QualifiedName;
use crate::symbol::{SymbolKind, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A parsed input file.
///
/// Parsing happens outside the engine; the adapter only walks the tree. The
/// text is kept alongside so node spans can be read back.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the project root
    pub path: String,
    pub language: Language,
    pub tree: tree_sitter::Tree,
    pub source: Arc<str>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, language: Language, tree: tree_sitter::Tree, source: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            language,
            tree,
            source: source.into(),
        }
    }

    /// Text of a syntax node
    pub fn text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// Location of a syntax node's start
    pub fn location(&self, node: tree_sitter::Node) -> SourceLocation {
        SourceLocation::from_point(self.path.clone(), node.start_position())
    }
}

/// What a raw declaration claims to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Known(SymbolKind),
    /// A construct the adapter cannot map onto a canonical kind
    Unknown(String),
}

/// A declaration as the adapter saw it, before it has an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub kind: DeclarationKind,
    /// Local name; may itself be dotted for namespace declarations
    pub name: String,
    /// Enclosing scope path
    pub scope: QualifiedName,
    pub visibility: Visibility,
    pub location: SourceLocation,
    /// Parameter count for callables
    #[serde(default)]
    pub arity: Option<u32>,
    /// Declared type (fields, properties, function results)
    #[serde(default)]
    pub type_hint: Option<String>,
}

impl RawDeclaration {
    pub fn new(kind: SymbolKind, name: impl Into<String>, scope: QualifiedName, location: SourceLocation) -> Self {
        Self {
            kind: DeclarationKind::Known(kind),
            name: name.into(),
            scope,
            visibility: Visibility::Public,
            location,
            arity: None,
            type_hint: None,
        }
    }

    pub fn unknown(construct: impl Into<String>, name: impl Into<String>, scope: QualifiedName, location: SourceLocation) -> Self {
        Self {
            kind: DeclarationKind::Unknown(construct.into()),
            name: name.into(),
            scope,
            visibility: Visibility::Public,
            location,
            arity: None,
            type_hint: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_arity(mut self, arity: u32) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn with_type_hint(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Scope path plus local name
    pub fn qualified_name(&self) -> QualifiedName {
        self.scope.child(&self.name)
    }
}

/// One name brought in by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The identifier this import binds locally
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Shape of an import clause.
///
/// - `import * as path from 'path'` → `alias: Some("path")`
/// - `import { greet } from './utils'` → `names: [greet]`
/// - `using MyApp.Models;` / `from x import *` → `open: true`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub names: Vec<ImportedName>,
    /// Every public member of the module becomes visible unqualified
    pub open: bool,
}

impl ImportSpec {
    pub fn open() -> Self {
        Self {
            open: true,
            ..Self::default()
        }
    }

    pub fn aliased(alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::default()
        }
    }

    pub fn named<I>(names: I) -> Self
    where
        I: IntoIterator<Item = ImportedName>,
    {
        Self {
            names: names.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Usage kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// Invocation, with the argument count when known
    Call { arity: Option<u32> },
    /// Any non-call mention (member read, type annotation, property write)
    Reference,
    /// Base class clause
    Inherit,
    /// Interface/protocol clause
    Implement,
    /// Import clause; the target expression is the module path
    Import(ImportSpec),
}

impl UsageKind {
    pub fn call(arity: u32) -> Self {
        UsageKind::Call { arity: Some(arity) }
    }
}

/// A usage as the adapter saw it, before resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUsage {
    pub kind: UsageKind,
    /// Target expression as written, e.g. `person.GetFullName` or `Utils.PI`
    pub target: String,
    /// Enclosing scope at the use site
    pub scope: QualifiedName,
    pub location: SourceLocation,
}

impl RawUsage {
    pub fn new(kind: UsageKind, target: impl Into<String>, scope: QualifiedName, location: SourceLocation) -> Self {
        Self {
            kind,
            target: target.into(),
            scope,
            location,
        }
    }
}

/// A syntactically evident type for a local name.
///
/// Covers typed parameters (`Greet(Person person)`) and constructor
/// initializers (`var p = new Person()`); nothing is inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBinding {
    pub name: String,
    pub type_name: String,
    /// Scope in which the name is bound
    pub scope: QualifiedName,
}

impl LocalBinding {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, scope: QualifiedName) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            scope,
        }
    }
}

/// Everything one adapter call produced for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub path: String,
    pub language: Language,
    pub declarations: Vec<RawDeclaration>,
    pub usages: Vec<RawUsage>,
    pub bindings: Vec<LocalBinding>,
}

impl Extraction {
    /// Create an empty extraction
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            declarations: Vec::new(),
            usages: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Add a declaration
    pub fn declare(&mut self, declaration: RawDeclaration) {
        self.declarations.push(declaration);
    }

    /// Add a usage
    pub fn usage(&mut self, usage: RawUsage) {
        self.usages.push(usage);
    }

    /// Add a local type binding
    pub fn bind(&mut self, binding: LocalBinding) {
        self.bindings.push(binding);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.usages.is_empty()
    }
}

/// Trait for language adapters
///
/// Each language adapter is responsible for:
/// 1. Mapping language constructs onto canonical declaration kinds
/// 2. Recording usages with their enclosing scope
/// 3. Reporting constructs it cannot map as `Unknown` declarations
///
/// Adapters never consult the registry, so files can be adapted in parallel.
pub trait LanguageAdapter: Send + Sync {
    /// The language tag this adapter handles
    fn language(&self) -> Language;

    /// Walk a parsed file and produce its declarations and usages
    fn extract(&self, file: &SourceFile) -> Result<Extraction>;
}

/// Registry of language adapters
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<Language, Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any previous one for its language
    pub fn register(&mut self, adapter: impl LanguageAdapter + 'static) {
        self.adapters.insert(adapter.language(), Box::new(adapter));
    }

    /// Find the adapter for a language
    pub fn find_adapter(&self, language: Language) -> Option<&dyn LanguageAdapter> {
        self.adapters.get(&language).map(|a| a.as_ref())
    }

    /// Languages with a registered adapter
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.adapters.keys().copied()
    }

    /// Extract a file using the adapter for its language
    pub fn extract(&self, file: &SourceFile) -> Result<Extraction> {
        let adapter = self
            .find_adapter(file.language)
            .ok_or(Error::NoAdapter(file.language))?;
        adapter.extract(file)
    }
}

/// Reject a file whose syntax errors left nothing but its module declaration.
///
/// A tree with errors that still yields declarations or usages is kept.
pub fn check_extracted(file: &SourceFile, extraction: Extraction) -> Result<Extraction> {
    let root = file.tree.root_node();
    let salvaged = extraction.declarations.len() > 1 || !extraction.usages.is_empty();
    if root.is_error() || (root.has_error() && !salvaged) {
        return Err(Error::adapter(&file.path, "syntax errors left nothing to extract"));
    }
    Ok(extraction)
}

/// Create a default registry with all built-in adapters
pub fn default_registry() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry.register(super::python::PythonAdapter::new());
    registry.register(super::typescript::TypeScriptAdapter::typescript());
    registry.register(super::typescript::TypeScriptAdapter::javascript());
    registry
}

/// Grammar bundled for a language, if any
pub fn grammar_for(language: Language) -> Option<tree_sitter::Language> {
    match language {
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        _ => None,
    }
}

/// Parse source text with a bundled grammar
///
/// Convenience for callers without their own parser; a tree with syntax
/// errors is still returned and adapted.
pub fn parse_source(path: impl Into<String>, language: Language, source: &str) -> Result<SourceFile> {
    let path = path.into();
    let grammar = grammar_for(language).ok_or(Error::NoAdapter(language))?;
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| Error::adapter(&path, e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::adapter(&path, "parser produced no tree"))?;
    Ok(SourceFile::new(path, language, tree, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAdapter;

    impl LanguageAdapter for TestAdapter {
        fn language(&self) -> Language {
            Language::Go
        }

        fn extract(&self, file: &SourceFile) -> Result<Extraction> {
            Ok(Extraction::new(&file.path, Language::Go))
        }
    }

    #[test]
    fn test_registry() {
        let mut registry = AdapterRegistry::new();
        registry.register(TestAdapter);

        assert!(registry.find_adapter(Language::Go).is_some());
        assert!(registry.find_adapter(Language::Swift).is_none());
    }

    #[test]
    fn test_missing_adapter_is_an_error() {
        let registry = AdapterRegistry::new();
        let file = parse_source("a.py", Language::Python, "x = 1\n").unwrap();
        assert!(matches!(registry.extract(&file), Err(Error::NoAdapter(Language::Python))));
    }

    #[test]
    fn test_default_registry_languages() {
        let registry = default_registry();
        let languages: Vec<Language> = registry.languages().collect();
        assert!(languages.contains(&Language::Python));
        assert!(languages.contains(&Language::TypeScript));
        assert!(languages.contains(&Language::JavaScript));
    }

    #[test]
    fn test_qualified_name_of_dotted_namespace() {
        let decl = RawDeclaration::new(
            SymbolKind::Module,
            "MyApp.Models",
            QualifiedName::root(),
            SourceLocation::new("Person.cs", 1, 1),
        );
        assert_eq!(decl.qualified_name().len(), 2);
    }

    #[test]
    fn test_imported_name_binding() {
        assert_eq!(ImportedName::new("greet").binding(), "greet");
        assert_eq!(ImportedName::aliased("greet", "hello").binding(), "hello");
    }
}
