//! TypeScript / JavaScript language adapter
//!
//! Maps ES module constructs onto the canonical model:
//! - every file is a `module` named after its path (`src/utils.ts` → `src.utils`)
//! - exported top-level declarations are `public`, the rest file-`private`
//! - relative import specifiers are rewritten into module paths
//! - `get`/`set` accessors become properties, `constructor` a method
//! - function bodies are local scopes; nothing declared inside them becomes a node

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

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// TypeScript / JavaScript adapter; one instance per language tag
pub struct TypeScriptAdapter {
    language: Language,
}

impl TypeScriptAdapter {
    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }

    pub fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }
}

impl LanguageAdapter for TypeScriptAdapter {
    fn language(&self) -> Language {
        self.language
    }

    fn extract(&self, file: &SourceFile) -> Result<Extraction> {
        let root = file.tree.root_node();
        let module = module_name(&file.path);

        let mut walker = Walker {
            file,
            out: Extraction::new(&file.path, self.language),
            module_names: collect_module_names(file, root),
        };

        walker.out.declare(RawDeclaration::new(
            SymbolKind::Module,
            module.to_string(),
            QualifiedName::root(),
            file.location(root),
        ));

        let scope = Scope {
            path: module,
            in_body: false,
        };
        walker.walk_children(root, &scope);
        check_extracted(file, walker.out)
    }
}

/// Module path of a source file: extension dropped, directories become segments
pub fn module_name(path: &str) -> QualifiedName {
    QualifiedName::parse(strip_extension(path))
}

fn strip_extension(path: &str) -> &str {
    let Some((stem, ext)) = path.rsplit_once('.') else {
        return path;
    };
    if stem.is_empty() || !SOURCE_EXTENSIONS.contains(&ext) {
        return path;
    }
    stem.strip_suffix(".d").unwrap_or(stem)
}

/// Rewrite an import specifier relative to the importing file.
///
/// Bare specifiers (`path`, `@scope/pkg`) are returned unchanged.
pub fn resolve_specifier(importing_file: &str, specifier: &str) -> String {
    if !specifier.starts_with('.') {
        return specifier.to_string();
    }

    let mut parts: Vec<&str> = importing_file.split('/').collect();
    parts.pop();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    strip_extension(&parts.join("/")).to_string()
}

#[derive(Debug, Clone)]
struct Scope {
    path: QualifiedName,
    /// Inside a function body
    in_body: bool,
}

impl Scope {
    fn enter(&self, name: &str, in_body: bool) -> Scope {
        Scope {
            path: self.path.child(name),
            in_body,
        }
    }
}

struct Walker<'a> {
    file: &'a SourceFile,
    out: Extraction,
    /// Identifiers bound at module level (imports and top-level declarations)
    module_names: HashSet<String>,
}

impl<'a> Walker<'a> {
    fn text(&self, node: Node) -> &'a str {
        let file: &'a SourceFile = self.file;
        file.text(node)
    }

    fn walk_children(&mut self, node: Node, scope: &Scope) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            self.walk(child, scope);
        }
    }

    fn walk(&mut self, node: Node, scope: &Scope) {
        match node.kind() {
            "comment" => {}
            "import_statement" => self.import(node, scope),
            "export_statement" => self.export(node, scope),
            "function_declaration" | "generator_function_declaration" | "class_declaration"
            | "abstract_class_declaration" | "interface_declaration" | "enum_declaration"
            | "type_alias_declaration" | "internal_module" | "module" | "lexical_declaration"
            | "variable_declaration" | "ambient_declaration" => self.declaration(node, scope, false),
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                self.local_function(node, scope)
            }
            "call_expression" => self.call(node, scope),
            "new_expression" => self.construct(node, scope),
            "member_expression" => self.member_reference(node, scope),
            "identifier" => self.identifier_reference(node, scope),
            _ => self.walk_children(node, scope),
        }
    }

    fn import(&mut self, node: Node, scope: &Scope) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let module = resolve_specifier(&self.file.path, unquote(self.text(source)));

        let mut spec = ImportSpec::default();
        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor).filter(|n| n.kind() == "import_clause") {
            let mut inner = clause.walk();
            for part in clause.named_children(&mut inner) {
                match part.kind() {
                    "identifier" => spec.names.push(ImportedName::aliased("default", self.text(part))),
                    "namespace_import" => {
                        let mut c = part.walk();
                        if let Some(alias) = part.named_children(&mut c).find(|n| n.kind() == "identifier") {
                            spec.alias = Some(self.text(alias).to_string());
                        }
                    }
                    "named_imports" => {
                        let mut c = part.walk();
                        for specifier in part.named_children(&mut c).filter(|n| n.kind() == "import_specifier") {
                            if let Some(imported) = self.specifier_name(specifier) {
                                spec.names.push(imported);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.out.usage(RawUsage::new(
            UsageKind::Import(spec),
            QualifiedName::parse(&module).to_string(),
            scope.path.clone(),
            self.file.location(node),
        ));
    }

    fn specifier_name(&self, specifier: Node) -> Option<ImportedName> {
        let name = self.text(specifier.child_by_field_name("name")?);
        Some(match specifier.child_by_field_name("alias") {
            Some(alias) => ImportedName::aliased(name, self.text(alias)),
            None => ImportedName::new(name),
        })
    }

    fn export(&mut self, node: Node, scope: &Scope) {
        if let Some(declaration) = node.child_by_field_name("declaration") {
            self.declaration(declaration, scope, true);
            return;
        }

        // `export { a } from './m'` and `export * from './m'` re-export a module
        if let Some(source) = node.child_by_field_name("source") {
            let module = resolve_specifier(&self.file.path, unquote(self.text(source)));
            let mut spec = ImportSpec::open();
            let mut cursor = node.walk();
            if let Some(clause) = node.named_children(&mut cursor).find(|n| n.kind() == "export_clause") {
                let mut c = clause.walk();
                let names: Vec<ImportedName> = clause
                    .named_children(&mut c)
                    .filter(|n| n.kind() == "export_specifier")
                    .filter_map(|n| self.specifier_name(n))
                    .collect();
                spec = ImportSpec::named(names);
            }
            self.out.usage(RawUsage::new(
                UsageKind::Import(spec),
                QualifiedName::parse(&module).to_string(),
                scope.path.clone(),
                self.file.location(node),
            ));
            return;
        }

        self.walk_children(node, scope);
    }

    fn visibility(&self, exported: bool) -> Visibility {
        if exported { Visibility::Public } else { Visibility::Private }
    }

    fn declaration(&mut self, node: Node, scope: &Scope, exported: bool) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.function(node, scope, exported)
            }
            "class_declaration" | "abstract_class_declaration" => self.class(node, scope, exported),
            "interface_declaration" => self.interface(node, scope, exported),
            "enum_declaration" => {
                if scope.in_body {
                    return;
                }
                if let Some(name) = node.child_by_field_name("name") {
                    self.out.declare(
                        RawDeclaration::new(SymbolKind::Type, self.text(name), scope.path.clone(), self.file.location(node))
                            .with_visibility(self.visibility(exported)),
                    );
                }
            }
            "type_alias_declaration" => {
                if scope.in_body {
                    return;
                }
                if let Some(name) = node.child_by_field_name("name") {
                    self.out.declare(
                        RawDeclaration::unknown(
                            "type_alias_declaration",
                            self.text(name),
                            scope.path.clone(),
                            self.file.location(node),
                        )
                        .with_visibility(self.visibility(exported)),
                    );
                }
            }
            "internal_module" | "module" => self.namespace(node, scope, exported),
            "lexical_declaration" | "variable_declaration" => self.variables(node, scope, exported),
            "ambient_declaration" => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                for child in children {
                    self.declaration(child, scope, exported);
                }
            }
            _ => self.walk(node, scope),
        }
    }

    fn function(&mut self, node: Node, scope: &Scope, exported: bool) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return self.walk_children(node, scope);
        };
        if scope.in_body {
            return self.local_function(node, scope);
        }

        let params = node.child_by_field_name("parameters");
        let mut decl = RawDeclaration::new(SymbolKind::Function, name, scope.path.clone(), self.file.location(node))
            .with_visibility(self.visibility(exported))
            .with_arity(params.map(|p| parameter_count(p)).unwrap_or(0));
        if let Some(hint) = node.child_by_field_name("return_type").and_then(|t| self.type_name(t)) {
            decl = decl.with_type_hint(hint);
        }
        self.out.declare(decl);

        let body_scope = scope.enter(name, true);
        self.callable_body(node, &body_scope, None);
    }

    /// Bind parameters and walk the body of any function-like node
    fn callable_body(&mut self, node: Node, body_scope: &Scope, owner: Option<&QualifiedName>) {
        if let Some(params) = node.child_by_field_name("parameters") {
            self.parameters(params, body_scope, owner);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, body_scope);
        }
    }

    /// Functions nested in bodies are locals of the enclosing scope
    fn local_function(&mut self, node: Node, scope: &Scope) {
        let inner = Scope {
            path: scope.path.clone(),
            in_body: true,
        };
        self.callable_body(node, &inner, None);
    }

    /// `owner` is the class when the parameters belong to its constructor
    fn parameters(&mut self, params: Node, scope: &Scope, owner: Option<&QualifiedName>) {
        let mut cursor = params.walk();
        let children: Vec<Node> = params.named_children(&mut cursor).collect();
        for param in children {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let Some(pattern) = param.child_by_field_name("pattern").filter(|p| p.kind() == "identifier") else {
                continue;
            };
            let name = self.text(pattern);
            let type_name = param.child_by_field_name("type").and_then(|t| self.type_name(t));

            if let Some(type_name) = &type_name {
                self.out.bind(LocalBinding::new(name, type_name.as_str(), scope.path.clone()));
            }

            // `constructor(private engine: Engine)` declares a field
            if let Some(owner) = owner {
                let mut c = param.walk();
                let modifier = param
                    .children(&mut c)
                    .find(|n| n.kind() == "accessibility_modifier")
                    .map(|n| self.text(n));
                let readonly = {
                    let mut c = param.walk();
                    param.children(&mut c).any(|n| n.kind() == "readonly")
                };
                if modifier.is_some() || readonly {
                    let mut decl = RawDeclaration::new(SymbolKind::Field, name, owner.clone(), self.file.location(param))
                        .with_visibility(member_visibility(modifier, name));
                    if let Some(type_name) = type_name {
                        decl = decl.with_type_hint(type_name);
                    }
                    self.out.declare(decl);
                }
            }

            if let Some(value) = param.child_by_field_name("value") {
                self.walk(value, scope);
            }
        }
    }

    fn class(&mut self, node: Node, scope: &Scope, exported: bool) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return self.walk_children(node, scope);
        };
        if scope.in_body {
            return self.walk_children(node, scope);
        }

        self.out.declare(
            RawDeclaration::new(SymbolKind::Type, name, scope.path.clone(), self.file.location(node))
                .with_visibility(self.visibility(exported)),
        );

        let class_path = scope.path.child(name);
        let class_scope = scope.enter(name, false);

        let mut cursor = node.walk();
        let heritage: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "class_heritage")
            .collect();
        for clause in heritage {
            self.heritage(clause, &class_scope);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.class_body(body, &class_path, &class_scope);
        }
    }

    fn heritage(&mut self, clause: Node, class_scope: &Scope) {
        let mut cursor = clause.walk();
        let parts: Vec<Node> = clause.named_children(&mut cursor).collect();
        for part in parts {
            match part.kind() {
                "extends_clause" => {
                    let mut c = part.walk();
                    let values: Vec<Node> = part.children_by_field_name("value", &mut c).collect();
                    for value in values {
                        self.supertype(value, UsageKind::Inherit, class_scope);
                    }
                }
                "implements_clause" => {
                    let mut c = part.walk();
                    let types: Vec<Node> = part.named_children(&mut c).collect();
                    for ty in types {
                        self.supertype(ty, UsageKind::Implement, class_scope);
                    }
                }
                // JavaScript: `class_heritage` holds the expression directly
                _ => self.supertype(part, UsageKind::Inherit, class_scope),
            }
        }
    }

    fn supertype(&mut self, node: Node, kind: UsageKind, scope: &Scope) {
        if let Some(target) = self.type_name(node).or_else(|| self.path_of(node)) {
            self.out.usage(RawUsage::new(kind, target, scope.path.clone(), self.file.location(node)));
        }
    }

    fn class_body(&mut self, body: Node, class_path: &QualifiedName, class_scope: &Scope) {
        let mut properties: HashSet<&str> = HashSet::new();
        let mut cursor = body.walk();
        let members: Vec<Node> = body.named_children(&mut cursor).collect();

        for member in members {
            match member.kind() {
                "method_definition" | "abstract_method_signature" => {
                    let Some(name_node) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let name = self.text(name_node);
                    let accessor = {
                        let mut c = member.walk();
                        member.children(&mut c).any(|n| matches!(n.kind(), "get" | "set"))
                    };
                    let visibility = member_visibility(self.modifier(member), name);

                    if accessor {
                        // getter and setter share one property node
                        if properties.insert(name) {
                            let mut decl = RawDeclaration::new(
                                SymbolKind::Property,
                                name,
                                class_path.clone(),
                                self.file.location(member),
                            )
                            .with_visibility(visibility);
                            if let Some(hint) = member.child_by_field_name("return_type").and_then(|t| self.type_name(t)) {
                                decl = decl.with_type_hint(hint);
                            }
                            self.out.declare(decl);
                        }
                    } else {
                        let arity = member.child_by_field_name("parameters").map(parameter_count).unwrap_or(0);
                        let mut decl = RawDeclaration::new(SymbolKind::Method, name, class_path.clone(), self.file.location(member))
                            .with_visibility(visibility)
                            .with_arity(arity);
                        if let Some(hint) = member.child_by_field_name("return_type").and_then(|t| self.type_name(t)) {
                            decl = decl.with_type_hint(hint);
                        }
                        self.out.declare(decl);
                    }

                    let owner = (name == "constructor").then_some(class_path);
                    let body_scope = class_scope.enter(name, true);
                    self.callable_body(member, &body_scope, owner);
                }
                "public_field_definition" | "field_definition" => {
                    let Some(name_node) = member
                        .child_by_field_name("name")
                        .or_else(|| member.child_by_field_name("property"))
                    else {
                        continue;
                    };
                    let name = self.text(name_node);
                    let value = member.child_by_field_name("value");
                    let mut decl = RawDeclaration::new(SymbolKind::Field, name, class_path.clone(), self.file.location(member))
                        .with_visibility(member_visibility(self.modifier(member), name));
                    let hint = member
                        .child_by_field_name("type")
                        .and_then(|t| self.type_name(t))
                        .or_else(|| value.and_then(|v| self.constructed_type(v)));
                    if let Some(hint) = hint {
                        decl = decl.with_type_hint(hint);
                    }
                    self.out.declare(decl);

                    if let Some(value) = value {
                        self.walk(value, class_scope);
                    }
                }
                // overload signatures and index signatures carry no body
                "method_signature" | "index_signature" | "comment" | "decorator" => {}
                _ => self.walk(member, class_scope),
            }
        }
    }

    fn modifier(&self, member: Node) -> Option<&'a str> {
        let mut cursor = member.walk();
        let found = member
            .children(&mut cursor)
            .find(|n| n.kind() == "accessibility_modifier");
        found.map(|n| self.text(n))
    }

    fn interface(&mut self, node: Node, scope: &Scope, exported: bool) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return;
        };
        if scope.in_body {
            return;
        }
        self.out.declare(
            RawDeclaration::new(SymbolKind::Type, name, scope.path.clone(), self.file.location(node))
                .with_visibility(self.visibility(exported)),
        );

        let path = scope.path.child(name);
        let iface_scope = scope.enter(name, false);

        let mut cursor = node.walk();
        let clauses: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "extends_type_clause")
            .collect();
        for clause in clauses {
            let mut c = clause.walk();
            let types: Vec<Node> = clause.named_children(&mut c).collect();
            for ty in types {
                self.supertype(ty, UsageKind::Inherit, &iface_scope);
            }
        }

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut c = body.walk();
        let members: Vec<Node> = body.named_children(&mut c).collect();
        let mut seen: HashSet<(&str, Option<u32>)> = HashSet::new();
        for member in members {
            let Some(member_name) = member.child_by_field_name("name").map(|n| self.text(n)) else {
                continue;
            };
            match member.kind() {
                "method_signature" => {
                    let arity = member.child_by_field_name("parameters").map(parameter_count).unwrap_or(0);
                    if seen.insert((member_name, Some(arity))) {
                        self.out.declare(
                            RawDeclaration::new(SymbolKind::Method, member_name, path.clone(), self.file.location(member))
                                .with_arity(arity),
                        );
                    }
                }
                "property_signature" => {
                    if seen.insert((member_name, None)) {
                        let mut decl =
                            RawDeclaration::new(SymbolKind::Field, member_name, path.clone(), self.file.location(member));
                        if let Some(hint) = member.child_by_field_name("type").and_then(|t| self.type_name(t)) {
                            decl = decl.with_type_hint(hint);
                        }
                        self.out.declare(decl);
                    }
                }
                _ => {}
            }
        }
    }

    fn namespace(&mut self, node: Node, scope: &Scope, exported: bool) {
        let Some(name) = node.child_by_field_name("name").map(|n| unquote(self.text(n))) else {
            return;
        };
        if scope.in_body {
            return;
        }
        self.out.declare(
            RawDeclaration::new(SymbolKind::Module, name, scope.path.clone(), self.file.location(node))
                .with_visibility(self.visibility(exported)),
        );
        if let Some(body) = node.child_by_field_name("body") {
            let inner = scope.enter(name, false);
            let mut cursor = body.walk();
            let statements: Vec<Node> = body.named_children(&mut cursor).collect();
            for statement in statements {
                self.walk(statement, &inner);
            }
        }
    }

    fn variables(&mut self, node: Node, scope: &Scope, exported: bool) {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "variable_declarator")
            .collect();

        for declarator in declarators {
            let value = declarator.child_by_field_name("value");
            let Some(name_node) = declarator.child_by_field_name("name").filter(|n| n.kind() == "identifier") else {
                if let Some(value) = value {
                    self.walk(value, scope);
                }
                continue;
            };
            let name = self.text(name_node);
            let hint = declarator
                .child_by_field_name("type")
                .and_then(|t| self.type_name(t))
                .or_else(|| value.and_then(|v| self.constructed_type(v)));

            if scope.in_body {
                if let Some(hint) = hint {
                    self.out.bind(LocalBinding::new(name, hint, scope.path.clone()));
                }
                if let Some(value) = value {
                    self.walk(value, scope);
                }
                continue;
            }

            let function_value = value.filter(|v| matches!(v.kind(), "arrow_function" | "function_expression" | "function"));
            if let Some(function) = function_value {
                let arity = function
                    .child_by_field_name("parameters")
                    .map(parameter_count)
                    .unwrap_or_else(|| u32::from(function.child_by_field_name("parameter").is_some()));
                self.out.declare(
                    RawDeclaration::new(SymbolKind::Function, name, scope.path.clone(), self.file.location(declarator))
                        .with_visibility(self.visibility(exported))
                        .with_arity(arity),
                );
                let body_scope = scope.enter(name, true);
                self.callable_body(function, &body_scope, None);
                continue;
            }

            let mut decl = RawDeclaration::new(SymbolKind::Field, name, scope.path.clone(), self.file.location(declarator))
                .with_visibility(self.visibility(exported));
            if let Some(hint) = hint {
                decl = decl.with_type_hint(hint);
            }
            self.out.declare(decl);
            if let Some(value) = value {
                self.walk(value, scope);
            }
        }
    }

    fn call(&mut self, node: Node, scope: &Scope) {
        let arguments = node.child_by_field_name("arguments");
        if let Some(function) = node.child_by_field_name("function") {
            match self.path_of(function) {
                Some(target) => {
                    let arity = arguments.filter(|a| a.kind() == "arguments").map(argument_count);
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

    fn construct(&mut self, node: Node, scope: &Scope) {
        let arguments = node.child_by_field_name("arguments");
        if let Some(constructor) = node.child_by_field_name("constructor") {
            match self.path_of(constructor) {
                Some(target) => self.out.usage(RawUsage::new(
                    UsageKind::Call {
                        arity: Some(arguments.map(argument_count).unwrap_or(0)),
                    },
                    target,
                    scope.path.clone(),
                    self.file.location(node),
                )),
                None => self.walk(constructor, scope),
            }
        }
        if let Some(arguments) = arguments {
            self.walk(arguments, scope);
        }
    }

    fn member_reference(&mut self, node: Node, scope: &Scope) {
        match self.path_of(node) {
            Some(path) => {
                let root = path.split('.').next().unwrap_or_default();
                if root == "this" || self.module_names.contains(root) {
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

    /// Dotted path of a callee or member expression, `None` for anything
    /// that is not a plain name chain
    fn path_of(&self, node: Node) -> Option<String> {
        match node.kind() {
            "identifier" | "this" | "super" | "property_identifier" | "private_property_identifier"
            | "type_identifier" | "nested_identifier" | "nested_type_identifier" => {
                Some(self.text(node).split_whitespace().collect())
            }
            "member_expression" => {
                let object = self.path_of(node.child_by_field_name("object")?)?;
                let property = self.text(node.child_by_field_name("property")?);
                Some(format!("{}.{}", object, property))
            }
            "non_null_expression" => self.path_of(node.named_child(0)?),
            _ => None,
        }
    }

    /// Name of a type annotation, ignoring type arguments and builtins
    fn type_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "type_annotation" | "parenthesized_type" => self.type_name(node.named_child(0)?),
            "generic_type" => self.type_name(node.child_by_field_name("name")?),
            "type_identifier" | "nested_type_identifier" | "identifier" | "member_expression" => {
                self.path_of(node)
            }
            _ => None,
        }
    }

    /// `new Engine(..)` → `Engine`
    fn constructed_type(&self, value: Node) -> Option<String> {
        if value.kind() != "new_expression" {
            return None;
        }
        self.path_of(value.child_by_field_name("constructor")?)
    }
}

fn member_visibility(modifier: Option<&str>, name: &str) -> Visibility {
    if name.starts_with('#') {
        return Visibility::Private;
    }
    match modifier {
        Some("private") | Some("protected") => Visibility::Private,
        _ => Visibility::Public,
    }
}

fn parameter_count(params: Node) -> u32 {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .count() as u32
}

fn argument_count(arguments: Node) -> u32 {
    parameter_count(arguments)
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Pre-pass over top-level statements collecting module-level bindings
fn collect_module_names(file: &SourceFile, root: Node) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        let statement = match statement.kind() {
            "export_statement" => match statement.child_by_field_name("declaration") {
                Some(declaration) => declaration,
                None => continue,
            },
            _ => statement,
        };

        match statement.kind() {
            "import_statement" => {
                let mut c = statement.walk();
                for clause in statement.named_children(&mut c).filter(|n| n.kind() == "import_clause") {
                    collect_import_bindings(file, clause, &mut names);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut c = statement.walk();
                for declarator in statement.named_children(&mut c) {
                    if let Some(name) = declarator.child_by_field_name("name").filter(|n| n.kind() == "identifier") {
                        names.insert(file.text(name).to_string());
                    }
                }
            }
            _ => {
                if let Some(name) = statement.child_by_field_name("name") {
                    names.insert(file.text(name).to_string());
                }
            }
        }
    }
    names
}

fn collect_import_bindings(file: &SourceFile, node: Node, names: &mut HashSet<String>) {
    match node.kind() {
        "identifier" => {
            names.insert(file.text(node).to_string());
        }
        "import_specifier" => {
            let binding = node
                .child_by_field_name("alias")
                .or_else(|| node.child_by_field_name("name"));
            if let Some(binding) = binding {
                names.insert(file.text(binding).to_string());
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_import_bindings(file, child, names);
            }
        }
    }
}
