//! Per-file import contexts
//!
//! The first resolution pass binds every import clause of a file to the
//! module it names. The resulting [`FileContext`] answers, for a root
//! identifier, which imported symbols it denotes and whether it belongs to a
//! unit outside the analyzed set.

use crate::adapter::ImportSpec;
use crate::id::SymbolId;
use crate::language::Language;
use crate::name::QualifiedName;
use std::collections::HashMap;

/// What an import clause points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// An analyzed module or package
    Namespace(SymbolId),
    /// A directly imported declaration (`import a.b.Widget`)
    Symbols(Vec<SymbolId>),
    /// A unit outside the analyzed set
    External,
    /// Nothing matches and no dependency declares it
    Missing,
}

impl ImportTarget {
    pub fn is_external(&self) -> bool {
        matches!(self, ImportTarget::External)
    }
}

/// One import clause with its bound target
#[derive(Debug, Clone)]
pub struct FileImport {
    pub module: QualifiedName,
    pub spec: ImportSpec,
    pub target: ImportTarget,
}

impl FileImport {
    /// Plain `import a.b` with no alias or name list binds its first segment
    fn is_plain(&self) -> bool {
        self.spec.alias.is_none() && self.spec.names.is_empty() && !self.spec.open
    }

    /// The identifier this clause introduces at the use site, if any
    fn bound_name(&self) -> Option<&str> {
        if let Some(alias) = &self.spec.alias {
            return Some(alias);
        }
        if !self.is_plain() {
            return None;
        }
        match self.target {
            ImportTarget::Symbols(_) => self.module.last(),
            _ => self.module.segments().first().map(String::as_str),
        }
    }
}

/// A name brought in by a named import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedBinding {
    pub ids: Vec<SymbolId>,
    pub external: bool,
}

/// Imports visible in one file
#[derive(Debug, Clone)]
pub struct FileContext {
    pub file: String,
    pub language: Language,
    imports: Vec<FileImport>,
    named: HashMap<String, NamedBinding>,
}

impl FileContext {
    pub fn new(file: impl Into<String>, language: Language) -> Self {
        Self {
            file: file.into(),
            language,
            imports: Vec::new(),
            named: HashMap::new(),
        }
    }

    pub fn add_import(&mut self, import: FileImport) {
        self.imports.push(import);
    }

    /// Bind a named import; a later import of the same name shadows earlier ones
    pub fn bind_name(&mut self, name: impl Into<String>, binding: NamedBinding) {
        self.named.insert(name.into(), binding);
    }

    pub fn imports(&self) -> &[FileImport] {
        &self.imports
    }

    pub fn named(&self, name: &str) -> Option<&NamedBinding> {
        self.named.get(name)
    }

    /// The clause binding `name` through an alias or a plain import
    pub fn bound(&self, name: &str) -> Option<&FileImport> {
        self.imports.iter().find(|import| import.bound_name() == Some(name))
    }

    /// Targets of wildcard / `using` imports
    pub fn open_namespaces(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.imports
            .iter()
            .filter(|import| import.spec.open)
            .filter_map(|import| match import.target {
                ImportTarget::Namespace(id) => Some(id),
                _ => None,
            })
    }

    /// Whether any wildcard import names an unanalyzed unit
    pub fn has_external_open_import(&self) -> bool {
        self.imports
            .iter()
            .any(|import| import.spec.open && import.target.is_external())
    }

    /// Whether `root` is bound by an import of an unanalyzed unit
    pub fn binds_external(&self, root: &str) -> bool {
        if self.named.get(root).is_some_and(|binding| binding.external) {
            return true;
        }
        self.imports.iter().filter(|import| import.target.is_external()).any(|import| {
            import.spec.alias.as_deref() == Some(root)
                || (import.spec.alias.is_none() && import.module.segments().first().map(String::as_str) == Some(root))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ImportedName;

    fn id(n: u8) -> SymbolId {
        SymbolId::parse(&format!("sym:{:032x}", n)).unwrap()
    }

    fn import(module: &str, spec: ImportSpec, target: ImportTarget) -> FileImport {
        FileImport {
            module: QualifiedName::parse(module),
            spec,
            target,
        }
    }

    #[test]
    fn test_bound_names() {
        let mut context = FileContext::new("app.py", Language::Python);
        context.add_import(import("os.path", ImportSpec::default(), ImportTarget::External));
        context.add_import(import("pkg.utils", ImportSpec::aliased("u"), ImportTarget::Namespace(id(1))));
        context.add_import(import("pkg.models.Car", ImportSpec::default(), ImportTarget::Symbols(vec![id(2)])));

        assert_eq!(context.bound("os").map(|i| i.module.to_string()), Some("os.path".to_string()));
        assert_eq!(context.bound("u").map(|i| i.target.clone()), Some(ImportTarget::Namespace(id(1))));
        assert!(context.bound("Car").is_some());
        assert!(context.bound("pkg").is_none());
    }

    #[test]
    fn test_external_bindings() {
        let mut context = FileContext::new("Program.cs", Language::CSharp);
        context.add_import(import("System", ImportSpec::open(), ImportTarget::External));
        context.add_import(import("MyApp.Models", ImportSpec::open(), ImportTarget::Namespace(id(3))));

        assert!(context.has_external_open_import());
        assert!(context.binds_external("System"));
        assert!(!context.binds_external("MyApp"));
        assert_eq!(context.open_namespaces().collect::<Vec<_>>(), vec![id(3)]);
    }

    #[test]
    fn test_named_bindings() {
        let mut context = FileContext::new("index.ts", Language::TypeScript);
        let spec = ImportSpec::named([ImportedName::new("greet")]);
        context.add_import(import("src.utils", spec, ImportTarget::Namespace(id(4))));
        context.bind_name("greet", NamedBinding { ids: vec![id(5)], external: false });
        context.bind_name("chalk", NamedBinding { ids: Vec::new(), external: true });

        assert_eq!(context.named("greet").map(|b| b.ids.clone()), Some(vec![id(5)]));
        assert!(context.binds_external("chalk"));
        assert!(context.bound("greet").is_none());
    }
}
