//! Python language adapter
//!
//! Extracts canonical declarations and usages from Python source files using
//! tree-sitter.

use crate::Result;
use crate::language::Language;
use crate::name::QualifiedName;
use crate::symbol::{SymbolKind, Visibility};
use super::framework::{
    Extraction, ImportSpec, ImportedName, LanguageAdapter, LocalBinding, RawDeclaration, RawUsage,
    SourceFile, UsageKind, check_extracted,
};
use std::collections::HashSet;
use tree_sitter::Node;

/// Python language adapter
#[derive(Debug, Default)]
pub struct PythonAdapter;

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, file: &SourceFile) -> Result<Extraction> {
        let root = file.tree.root_node();
        let module = module_name(&file.path);

        let mut walker = Walker {
            file,
            out: Extraction::new(&file.path, Language::Python),
            module_names: HashSet::new(),
            declared: HashSet::new(),
        };
        walker.collect_module_names(root);

        walker.out.declare(RawDeclaration::new(
            SymbolKind::Module,
            module.to_string(),
            QualifiedName::root(),
            file.location(root),
        ));

        let scope = Scope::module(module);
        walker.walk_children(root, &scope);
        check_extracted(file, walker.out)
    }
}

/// Dotted module name of a file; `pkg/__init__.py` names the package itself.
/// A top-level `__init__.py` has no package to name and keeps `__init__`.
pub fn module_name(path: &str) -> QualifiedName {
    let stem = path
        .strip_suffix(".py")
        .or_else(|| path.strip_suffix(".pyi"))
        .unwrap_or(path);
    let stem = stem.strip_suffix("/__init__").unwrap_or(stem);
    QualifiedName::from_segments(stem.split('/'))
}

/// Leading-underscore names are private by convention; dunders are not
fn visibility_of(name: &str) -> Visibility {
    if name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__")) {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Module,
    Class,
    Function,
}

#[derive(Debug, Clone)]
struct Scope {
    path: QualifiedName,
    kind: ScopeKind,
    /// Enclosing class of a method body, for `self.x = ...` fields
    class: Option<QualifiedName>,
}

impl Scope {
    fn module(path: QualifiedName) -> Self {
        Self {
            path,
            kind: ScopeKind::Module,
            class: None,
        }
    }
}

struct Walker<'a> {
    file: &'a SourceFile,
    out: Extraction,
    /// Names bound at module level (imports, defs, assignments)
    module_names: HashSet<String>,
    /// Qualified names already declared as fields, to skip reassignments
    declared: HashSet<QualifiedName>,
}

impl<'a> Walker<'a> {
    fn text(&self, node: Node) -> &'a str {
        let file: &'a SourceFile = self.file;
        file.text(node)
    }

    fn collect_module_names(&mut self, root: Node) {
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            let statement = match statement.kind() {
                "decorated_definition" => match statement.child_by_field_name("definition") {
                    Some(definition) => definition,
                    None => continue,
                },
                "expression_statement" => match statement.named_child(0) {
                    Some(inner) => inner,
                    None => continue,
                },
                _ => statement,
            };
            match statement.kind() {
                "function_definition" | "class_definition" => {
                    if let Some(name) = statement.child_by_field_name("name") {
                        self.module_names.insert(self.text(name).to_string());
                    }
                }
                "assignment" => {
                    if let Some(left) = statement.child_by_field_name("left").filter(|n| n.kind() == "identifier") {
                        self.module_names.insert(self.text(left).to_string());
                    }
                }
                "import_statement" => {
                    let mut c = statement.walk();
                    let names: Vec<Node> = statement.children_by_field_name("name", &mut c).collect();
                    for name in names {
                        let binding = match name.kind() {
                            "aliased_import" => name.child_by_field_name("alias").map(|a| self.text(a)),
                            _ => self.text(name).split('.').next(),
                        };
                        if let Some(binding) = binding {
                            self.module_names.insert(binding.to_string());
                        }
                    }
                }
                "import_from_statement" => {
                    let mut c = statement.walk();
                    let names: Vec<Node> = statement.children_by_field_name("name", &mut c).collect();
                    for name in names {
                        let binding = match name.kind() {
                            "aliased_import" => name.child_by_field_name("alias").map(|a| self.text(a)),
                            _ => Some(self.text(name)),
                        };
                        if let Some(binding) = binding {
                            self.module_names.insert(binding.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_children(&mut self, node: Node, scope: &Scope) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            self.walk(child, scope);
        }
    }

    /// Walk the AST and extract all declarations and usages
    fn walk(&mut self, node: Node, scope: &Scope) {
        match node.kind() {
            "comment" => {}
            "function_definition" => self.function(node, scope, &[]),
            "class_definition" => self.class(node, scope),
            "decorated_definition" => {
                let decorators = self.decorators(node);
                match node.child_by_field_name("definition") {
                    Some(def) if def.kind() == "function_definition" => self.function(def, scope, &decorators),
                    Some(def) => self.walk(def, scope),
                    None => {}
                }
            }
            "import_statement" | "import_from_statement" => self.import(node, scope),
            "assignment" => self.assignment(node, scope),
            "call" => self.call(node, scope),
            "attribute" => self.attribute_reference(node, scope),
            "identifier" => self.identifier_reference(node, scope),
            // `lambda x: ...` parameters are locals
            "lambda" => {
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk(body, scope);
                }
            }
            _ => self.walk_children(node, scope),
        }
    }

    fn decorators(&self, node: Node) -> Vec<&'a str> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|n| n.kind() == "decorator")
            .filter_map(|n| n.named_child(0))
            .map(|expr| self.text(expr))
            .collect()
    }

    /// Extract function definition
    fn function(&mut self, node: Node, scope: &Scope, decorators: &[&str]) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return;
        };

        let body_scope = Scope {
            path: scope.path.child(name),
            kind: ScopeKind::Function,
            class: (scope.kind == ScopeKind::Class).then(|| scope.path.clone()),
        };

        match scope.kind {
            // nested defs are locals of the enclosing function
            ScopeKind::Function => {
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk(body, scope);
                }
                return;
            }
            ScopeKind::Module => {
                let arity = self.parameters(node, &body_scope, false);
                let mut decl = RawDeclaration::new(SymbolKind::Function, name, scope.path.clone(), self.file.location(node))
                    .with_visibility(visibility_of(name))
                    .with_arity(arity);
                if let Some(hint) = self.return_hint(node) {
                    decl = decl.with_type_hint(hint);
                }
                self.out.declare(decl);
            }
            ScopeKind::Class => {
                let is_property = decorators.iter().any(|d| *d == "property" || d.ends_with(".setter") || d.ends_with(".getter"));
                let is_static = decorators.contains(&"staticmethod");
                if is_property {
                    let path = scope.path.child(name);
                    if self.declared.insert(path) {
                        let mut decl =
                            RawDeclaration::new(SymbolKind::Property, name, scope.path.clone(), self.file.location(node))
                                .with_visibility(visibility_of(name));
                        if let Some(hint) = self.return_hint(node) {
                            decl = decl.with_type_hint(hint);
                        }
                        self.out.declare(decl);
                    }
                    self.parameters(node, &body_scope, true);
                } else {
                    let arity = self.parameters(node, &body_scope, !is_static);
                    let mut decl = RawDeclaration::new(SymbolKind::Method, name, scope.path.clone(), self.file.location(node))
                        .with_visibility(visibility_of(name))
                        .with_arity(arity);
                    if let Some(hint) = self.return_hint(node) {
                        decl = decl.with_type_hint(hint);
                    }
                    self.out.declare(decl);
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, &body_scope);
        }
    }

    fn return_hint(&self, node: Node) -> Option<String> {
        node.child_by_field_name("return_type").and_then(|t| self.type_name(t))
    }

    /// Bind typed parameters; returns the arity seen by callers
    fn parameters(&mut self, node: Node, body_scope: &Scope, skip_receiver: bool) -> u32 {
        let Some(params) = node.child_by_field_name("parameters") else {
            return 0;
        };
        let mut cursor = params.walk();
        let children: Vec<Node> = params
            .named_children(&mut cursor)
            .filter(|n| !matches!(n.kind(), "comment" | "keyword_separator" | "positional_separator"))
            .collect();

        let mut arity = 0;
        for (index, param) in children.into_iter().enumerate() {
            if skip_receiver && index == 0 {
                continue;
            }
            arity += 1;

            let (name, ty) = match param.kind() {
                "typed_parameter" => {
                    let mut c = param.walk();
                    let name = param.named_children(&mut c).find(|n| n.kind() == "identifier");
                    (name, param.child_by_field_name("type"))
                }
                "typed_default_parameter" => (param.child_by_field_name("name"), param.child_by_field_name("type")),
                _ => (None, None),
            };
            if let (Some(name), Some(type_name)) = (name, ty.and_then(|t| self.type_name(t))) {
                self.out.bind(LocalBinding::new(self.text(name), type_name, body_scope.path.clone()));
            }
            if let Some(value) = param.child_by_field_name("value") {
                self.walk(value, body_scope);
            }
        }
        arity
    }

    /// Extract class definition
    fn class(&mut self, node: Node, scope: &Scope) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return;
        };
        if scope.kind == ScopeKind::Function {
            return self.walk_children(node, scope);
        }

        self.out.declare(
            RawDeclaration::new(SymbolKind::Type, name, scope.path.clone(), self.file.location(node))
                .with_visibility(visibility_of(name)),
        );

        let class_scope = Scope {
            path: scope.path.child(name),
            kind: ScopeKind::Class,
            class: None,
        };

        // Check for inheritance
        if let Some(bases) = node.child_by_field_name("superclasses") {
            self.extract_inheritance(bases, &class_scope);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body, &class_scope);
        }
    }

    /// Extract inheritance relationships
    fn extract_inheritance(&mut self, bases: Node, class_scope: &Scope) {
        let mut cursor = bases.walk();
        let children: Vec<Node> = bases.named_children(&mut cursor).collect();
        for base in children {
            match self.dotted_path(base) {
                Some(target) => self.out.usage(RawUsage::new(
                    UsageKind::Inherit,
                    target,
                    class_scope.path.clone(),
                    self.file.location(base),
                )),
                // metaclass=..., Generic[T], ...
                None => self.walk(base, class_scope),
            }
        }
    }

    /// Extract import statement
    fn import(&mut self, node: Node, scope: &Scope) {
        let location = self.file.location(node);
        match node.kind() {
            "import_statement" => {
                // import foo.bar, baz as b
                let mut cursor = node.walk();
                let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
                for name in names {
                    let (module, spec) = match name.kind() {
                        "aliased_import" => {
                            let module = name.child_by_field_name("name").map(|n| self.text(n)).unwrap_or_default();
                            let alias = name.child_by_field_name("alias").map(|n| self.text(n)).unwrap_or(module);
                            (module, ImportSpec::aliased(alias))
                        }
                        _ => (self.text(name), ImportSpec::default()),
                    };
                    self.out.usage(RawUsage::new(
                        UsageKind::Import(spec),
                        module,
                        scope.path.clone(),
                        location.clone(),
                    ));
                }
            }
            "import_from_statement" => {
                // from foo import bar, baz
                let module = node
                    .child_by_field_name("module_name")
                    .map(|n| self.module_path(n))
                    .unwrap_or_default();

                let mut cursor = node.walk();
                let wildcard = node.named_children(&mut cursor).any(|n| n.kind() == "wildcard_import");
                let spec = if wildcard {
                    ImportSpec::open()
                } else {
                    let mut c = node.walk();
                    let names: Vec<Node> = node.children_by_field_name("name", &mut c).collect();
                    ImportSpec::named(names.into_iter().filter_map(|n| match n.kind() {
                        "aliased_import" => {
                            let name = self.text(n.child_by_field_name("name")?);
                            let alias = self.text(n.child_by_field_name("alias")?);
                            Some(ImportedName::aliased(name, alias))
                        }
                        _ => Some(ImportedName::new(self.text(n))),
                    }))
                };

                self.out.usage(RawUsage::new(
                    UsageKind::Import(spec),
                    module,
                    scope.path.clone(),
                    location,
                ));
            }
            _ => {}
        }
    }

    /// Absolute module path of a `from` clause, resolving leading dots
    fn module_path(&self, node: Node) -> String {
        if node.kind() != "relative_import" {
            return self.text(node).to_string();
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        let dots = children
            .iter()
            .find(|n| n.kind() == "import_prefix")
            .map(|n| self.text(*n).len())
            .unwrap_or(1);
        let rest = children
            .iter()
            .find(|n| n.kind() == "dotted_name")
            .map(|n| self.text(*n));

        // one dot is the file's own package
        let mut package: Vec<&str> = self.file.path.split('/').collect();
        package.pop();
        for _ in 1..dots {
            package.pop();
        }
        let mut path = QualifiedName::from_segments(package);
        if let Some(rest) = rest {
            path = path.join(&QualifiedName::parse(rest));
        }
        path.to_string()
    }

    fn assignment(&mut self, node: Node, scope: &Scope) {
        let left = node.child_by_field_name("left");
        let right = node.child_by_field_name("right");
        let annotated = node.child_by_field_name("type").and_then(|t| self.type_name(t));
        let hint = annotated.or_else(|| right.and_then(|r| self.constructed_type(r)));

        match left {
            Some(target) if target.kind() == "identifier" => {
                let name = self.text(target);
                match scope.kind {
                    ScopeKind::Module | ScopeKind::Class => {
                        self.field(name, &scope.path, target, hint);
                    }
                    ScopeKind::Function => {
                        if let Some(hint) = hint {
                            self.out.bind(LocalBinding::new(name, hint, scope.path.clone()));
                        }
                    }
                }
            }
            // self.engine = engine
            Some(target) if target.kind() == "attribute" => {
                let object = target.child_by_field_name("object").map(|o| self.text(o));
                let attribute = target.child_by_field_name("attribute").map(|a| self.text(a));
                match (object, attribute, scope.class.clone()) {
                    (Some("self"), Some(attribute), Some(class)) => {
                        self.field(attribute, &class, target, hint);
                    }
                    _ => self.attribute_reference(target, scope),
                }
            }
            Some(target) => self.walk(target, scope),
            None => {}
        }

        if let Some(right) = right {
            self.walk(right, scope);
        }
    }

    fn field(&mut self, name: &str, owner: &QualifiedName, node: Node, hint: Option<String>) {
        if !self.declared.insert(owner.child(name)) {
            return;
        }
        let mut decl = RawDeclaration::new(SymbolKind::Field, name, owner.clone(), self.file.location(node))
            .with_visibility(visibility_of(name));
        if let Some(hint) = hint {
            decl = decl.with_type_hint(hint);
        }
        self.out.declare(decl);
    }

    /// Extract call expression
    fn call(&mut self, node: Node, scope: &Scope) {
        let arguments = node.child_by_field_name("arguments");
        if let Some(function) = node.child_by_field_name("function") {
            match self.dotted_path(function) {
                Some(target) => {
                    let arity = arguments.filter(|a| a.kind() == "argument_list").map(|args| {
                        let mut c = args.walk();
                        args.named_children(&mut c).filter(|n| n.kind() != "comment").count() as u32
                    });
                    self.out.usage(RawUsage::new(
                        UsageKind::Call { arity },
                        target,
                        scope.path.clone(),
                        self.file.location(node),
                    ));
                }
                None => self.walk(function, scope),
            }
        }
        if let Some(arguments) = arguments {
            self.walk(arguments, scope);
        }
    }

    fn attribute_reference(&mut self, node: Node, scope: &Scope) {
        match self.dotted_path(node) {
            Some(path) => {
                let root = path.split('.').next().unwrap_or_default();
                if matches!(root, "self" | "cls") || self.module_names.contains(root) {
                    self.out.usage(RawUsage::new(
                        UsageKind::Reference,
                        path,
                        scope.path.clone(),
                        self.file.location(node),
                    ));
                }
            }
            None => self.walk_children(node, scope),
        }
    }

    fn identifier_reference(&mut self, node: Node, scope: &Scope) {
        let name = self.text(node);
        if self.module_names.contains(name) {
            self.out.usage(RawUsage::new(
                UsageKind::Reference,
                name,
                scope.path.clone(),
                self.file.location(node),
            ));
        }
    }

    fn dotted_path(&self, node: Node) -> Option<String> {
        match node.kind() {
            "identifier" => Some(self.text(node).to_string()),
            "attribute" => {
                let object = self.dotted_path(node.child_by_field_name("object")?)?;
                let attribute = self.text(node.child_by_field_name("attribute")?);
                Some(format!("{}.{}", object, attribute))
            }
            _ => None,
        }
    }

    /// Annotation name, ignoring subscripts like `list[int]`
    fn type_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "type" => self.type_name(node.named_child(0)?),
            "generic_type" | "subscript" => None,
            "string" => None,
            _ => self.dotted_path(node),
        }
    }

    /// `Engine(...)` → `Engine`
    fn constructed_type(&self, value: Node) -> Option<String> {
        if value.kind() != "call" {
            return None;
        }
        self.dotted_path(value.child_by_field_name("function")?)
    }
}
