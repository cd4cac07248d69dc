//! Scope-chain strategies
//!
//! Languages disagree on what a use site can see:
//! - `Nested` (C#, Java, Swift, Rust, Go): every enclosing type and namespace
//!   is a lexical scope, so a method sees its class members and every
//!   namespace prefix above it.
//! - `Module` (Python, TypeScript, JavaScript): lookups go from the function
//!   body straight to the file module; class bodies are not visible from
//!   methods and nothing above the file module is in scope.
//!
//! Strategies also know each language's receiver keywords, constructor
//! naming and module path conventions.

use crate::language::Language;
use crate::name::QualifiedName;
use crate::registry::SymbolTable;
use crate::symbol::SymbolKind;
use std::collections::BTreeMap;

/// How a type's constructor member is named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorStyle {
    /// A member with a fixed name (`constructor`, `__init__`, `init`)
    Named(&'static str),
    /// A member named after the type itself (C#, Java)
    TypeName,
    /// No constructor members (Go, Rust)
    None,
}

/// Per-language scope rules used by the resolver.
pub trait ScopeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scopes to search for an unqualified name, innermost first.
    ///
    /// The root scope is never included; the resolver consults imports and
    /// the global scope after this chain.
    fn scope_chain(&self, table: &SymbolTable, language: Language, scope: &QualifiedName) -> Vec<QualifiedName>;

    /// Keywords naming the enclosing instance (`this`, `self`)
    fn self_keywords(&self) -> &[&'static str];

    /// Keywords naming the base type (`base`, `super`)
    fn base_keywords(&self) -> &[&'static str];

    fn constructor_style(&self) -> ConstructorStyle;

    /// Whether top-level names resolve without an import
    fn global_scope_visible(&self) -> bool {
        true
    }

    /// Candidate node names for an imported module path
    fn module_candidates(&self, path: &QualifiedName) -> Vec<QualifiedName> {
        vec![path.clone()]
    }

    /// Constructor member names for a type
    fn constructor_names(&self, type_name: &str) -> Vec<String> {
        match self.constructor_style() {
            ConstructorStyle::Named(name) => vec![name.to_string()],
            ConstructorStyle::TypeName => vec![type_name.to_string()],
            ConstructorStyle::None => Vec::new(),
        }
    }
}

/// Block-structured languages where every enclosing scope is visible
#[derive(Debug, Clone)]
pub struct NestedScopes {
    self_keywords: &'static [&'static str],
    base_keywords: &'static [&'static str],
    constructor: ConstructorStyle,
}

impl NestedScopes {
    pub fn csharp() -> Self {
        Self {
            self_keywords: &["this"],
            base_keywords: &["base"],
            constructor: ConstructorStyle::TypeName,
        }
    }

    pub fn java() -> Self {
        Self {
            self_keywords: &["this"],
            base_keywords: &["super"],
            constructor: ConstructorStyle::TypeName,
        }
    }

    pub fn swift() -> Self {
        Self {
            self_keywords: &["self", "Self"],
            base_keywords: &["super"],
            constructor: ConstructorStyle::Named("init"),
        }
    }

    pub fn rust() -> Self {
        Self {
            self_keywords: &["self", "Self"],
            base_keywords: &[],
            constructor: ConstructorStyle::None,
        }
    }

    pub fn go() -> Self {
        Self {
            self_keywords: &[],
            base_keywords: &[],
            constructor: ConstructorStyle::None,
        }
    }
}

impl ScopeStrategy for NestedScopes {
    fn name(&self) -> &'static str {
        "nested"
    }

    fn scope_chain(&self, _table: &SymbolTable, _language: Language, scope: &QualifiedName) -> Vec<QualifiedName> {
        scope.ancestors().filter(|s| !s.is_root()).collect()
    }

    fn self_keywords(&self) -> &[&'static str] {
        self.self_keywords
    }

    fn base_keywords(&self) -> &[&'static str] {
        self.base_keywords
    }

    fn constructor_style(&self) -> ConstructorStyle {
        self.constructor
    }
}

/// File-module languages where lookups skip class bodies
#[derive(Debug, Clone)]
pub struct ModuleScopes {
    self_keywords: &'static [&'static str],
    base_keywords: &'static [&'static str],
    constructor: ConstructorStyle,
    /// Directory modules resolve to this file (`index` for TypeScript)
    index_module: Option<&'static str>,
}

impl ModuleScopes {
    pub fn python() -> Self {
        Self {
            self_keywords: &["self", "cls"],
            base_keywords: &["super"],
            constructor: ConstructorStyle::Named("__init__"),
            index_module: None,
        }
    }

    pub fn typescript() -> Self {
        Self {
            self_keywords: &["this"],
            base_keywords: &["super"],
            constructor: ConstructorStyle::Named("constructor"),
            index_module: Some("index"),
        }
    }
}

impl ScopeStrategy for ModuleScopes {
    fn name(&self) -> &'static str {
        "module"
    }

    fn scope_chain(&self, table: &SymbolTable, language: Language, scope: &QualifiedName) -> Vec<QualifiedName> {
        let mut chain = Vec::new();
        for candidate in scope.ancestors().filter(|s| !s.is_root()) {
            let kinds: Vec<SymbolKind> = table
                .named(language, &candidate)
                .iter()
                .filter_map(|id| table.node(*id))
                .map(|node| node.kind)
                .collect();

            if kinds.iter().any(|k| k.is_namespace()) {
                chain.push(candidate);
                break;
            }
            if kinds.contains(&SymbolKind::Type) {
                continue;
            }
            chain.push(candidate);
        }
        chain
    }

    fn self_keywords(&self) -> &[&'static str] {
        self.self_keywords
    }

    fn base_keywords(&self) -> &[&'static str] {
        self.base_keywords
    }

    fn constructor_style(&self) -> ConstructorStyle {
        self.constructor
    }

    fn global_scope_visible(&self) -> bool {
        false
    }

    fn module_candidates(&self, path: &QualifiedName) -> Vec<QualifiedName> {
        let mut candidates = vec![path.clone()];
        if let Some(index) = self.index_module {
            candidates.push(path.child(index));
        }
        candidates
    }
}

/// Strategy per language tag
pub struct ScopeStrategies {
    strategies: BTreeMap<Language, Box<dyn ScopeStrategy>>,
    fallback: NestedScopes,
}

impl ScopeStrategies {
    /// Create an empty set; every language falls back to C#-style nesting
    pub fn new() -> Self {
        Self {
            strategies: BTreeMap::new(),
            fallback: NestedScopes::csharp(),
        }
    }

    pub fn register(&mut self, language: Language, strategy: impl ScopeStrategy + 'static) {
        self.strategies.insert(language, Box::new(strategy));
    }

    pub fn for_language(&self, language: Language) -> &dyn ScopeStrategy {
        match self.strategies.get(&language) {
            Some(strategy) => strategy.as_ref(),
            None => &self.fallback,
        }
    }
}

impl Default for ScopeStrategies {
    fn default() -> Self {
        let mut strategies = Self::new();
        strategies.register(Language::CSharp, NestedScopes::csharp());
        strategies.register(Language::Java, NestedScopes::java());
        strategies.register(Language::Swift, NestedScopes::swift());
        strategies.register(Language::Rust, NestedScopes::rust());
        strategies.register(Language::Go, NestedScopes::go());
        strategies.register(Language::Python, ModuleScopes::python());
        strategies.register(Language::TypeScript, ModuleScopes::typescript());
        strategies.register(Language::JavaScript, ModuleScopes::typescript());
        strategies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RawDeclaration;
    use crate::location::SourceLocation;
    use crate::registry::Registry;

    fn python_table() -> SymbolTable {
        let mut registry = Registry::new("cars");
        let loc = |line| SourceLocation::new("field_use/car.py", line, 1);
        let decls = [
            RawDeclaration::new(SymbolKind::Module, "field_use.car", QualifiedName::root(), loc(1)),
            RawDeclaration::new(SymbolKind::Type, "Car", QualifiedName::parse("field_use.car"), loc(4)),
            RawDeclaration::new(SymbolKind::Method, "display_info", QualifiedName::parse("field_use.car.Car"), loc(9))
                .with_arity(0),
        ];
        for decl in &decls {
            registry.register(Language::Python, decl).unwrap();
        }
        registry.close()
    }

    fn names(chain: &[QualifiedName]) -> Vec<String> {
        chain.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_nested_chain_includes_every_prefix() {
        let table = python_table();
        let chain = NestedScopes::csharp().scope_chain(
            &table,
            Language::CSharp,
            &QualifiedName::parse("MyApp.Services.GreetingService.Greet"),
        );
        assert_eq!(
            names(&chain),
            vec![
                "MyApp.Services.GreetingService.Greet",
                "MyApp.Services.GreetingService",
                "MyApp.Services",
                "MyApp"
            ]
        );
    }

    #[test]
    fn test_module_chain_skips_class_bodies() {
        let table = python_table();
        let chain = ModuleScopes::python().scope_chain(
            &table,
            Language::Python,
            &QualifiedName::parse("field_use.car.Car.display_info"),
        );
        assert_eq!(names(&chain), vec!["field_use.car.Car.display_info", "field_use.car"]);
    }

    #[test]
    fn test_index_module_candidates() {
        let path = QualifiedName::parse("src.utils");
        let candidates = ModuleScopes::typescript().module_candidates(&path);
        assert_eq!(names(&candidates), vec!["src.utils", "src.utils.index"]);
        assert_eq!(ModuleScopes::python().module_candidates(&path).len(), 1);
    }

    #[test]
    fn test_constructor_names() {
        assert_eq!(NestedScopes::csharp().constructor_names("Person"), vec!["Person"]);
        assert_eq!(ModuleScopes::python().constructor_names("Car"), vec!["__init__"]);
        assert!(NestedScopes::go().constructor_names("T").is_empty());
    }

    #[test]
    fn test_default_strategies() {
        let strategies = ScopeStrategies::default();
        assert_eq!(strategies.for_language(Language::Python).name(), "module");
        assert_eq!(strategies.for_language(Language::Swift).name(), "nested");
        assert_eq!(strategies.for_language(Language::Swift).self_keywords(), &["self", "Self"]);
        assert!(strategies.for_language(Language::Java).global_scope_visible());
        assert!(!strategies.for_language(Language::TypeScript).global_scope_visible());
    }
}
