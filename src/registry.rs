//! Symbol Registry
//!
//! Collects canonical declarations from every file and language into uniquely
//! identified nodes. Population goes through the mutable [`Registry`]; once all
//! files are in, [`Registry::close`] consumes it and hands out the read-only
//! [`SymbolTable`] that resolution works against. No resolution code can see a
//! half-populated registry.
//!
//! Closing also:
//! - creates one root package node per language
//! - synthesizes implicit modules for scopes nobody declared (`MyApp` in
//!   `namespace MyApp.Models`)
//! - links every node to its container and emits the `declares` edges

use crate::adapter::{DeclarationKind, Extraction, RawDeclaration};
use crate::diagnostics::Diagnostic;
use crate::edge::{Edge, EdgeKind};
use crate::id::SymbolId;
use crate::language::Language;
use crate::location::SourceLocation;
use crate::manifest::DependencyManifest;
use crate::name::QualifiedName;
use crate::symbol::{Node, SymbolKind, Visibility};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Two declarations in one file claim the same identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate {kind} `{qualified_name}` at {location} (first declared at {first})")]
pub struct DuplicateDeclarationError {
    pub qualified_name: QualifiedName,
    pub kind: SymbolKind,
    pub location: SourceLocation,
    pub first: SourceLocation,
}

impl From<DuplicateDeclarationError> for Diagnostic {
    fn from(err: DuplicateDeclarationError) -> Self {
        Diagnostic::DuplicateDeclaration {
            location: err.location,
            qualified_name: err.qualified_name,
            kind: err.kind,
            first: err.first,
        }
    }
}

/// Mutable registry, populated by a single writer.
#[derive(Debug)]
pub struct Registry {
    project: String,
    nodes: BTreeMap<SymbolId, Node>,
    /// First location of each id per file, for same-file duplicate checks
    seen: HashMap<(String, SymbolId), SourceLocation>,
    /// Every language seen, including files that declared nothing
    languages: BTreeSet<Language>,
    manifests: Vec<DependencyManifest>,
    diagnostics: Vec<Diagnostic>,
}

impl Registry {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            nodes: BTreeMap::new(),
            seen: HashMap::new(),
            languages: BTreeSet::new(),
            manifests: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Number of nodes registered so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register one declaration.
    ///
    /// Returns `Ok(None)` for declarations that do not become nodes (unknown
    /// constructs, anonymous declarations); those are recorded as coverage
    /// gaps. Declarations sharing an identity across files merge into one node.
    pub fn register(
        &mut self,
        language: Language,
        decl: &RawDeclaration,
    ) -> std::result::Result<Option<SymbolId>, DuplicateDeclarationError> {
        self.languages.insert(language);
        let kind = match &decl.kind {
            DeclarationKind::Known(kind) => *kind,
            DeclarationKind::Unknown(construct) => {
                self.diagnostics.push(Diagnostic::CoverageGap {
                    location: decl.location.clone(),
                    construct: construct.clone(),
                });
                return Ok(None);
            }
        };

        let qualified_name = decl.qualified_name();
        if qualified_name.is_root() {
            self.diagnostics.push(Diagnostic::CoverageGap {
                location: decl.location.clone(),
                construct: format!("anonymous {}", kind),
            });
            return Ok(None);
        }

        let arity = if kind.is_callable() { decl.arity } else { None };
        let id = SymbolId::derive(&self.project, language, kind, &qualified_name, arity);

        let file = decl.location.file.clone();
        if let Some(first) = self.seen.get(&(file.clone(), id)) {
            // namespaces may be reopened within a file
            if !kind.is_namespace() {
                return Err(DuplicateDeclarationError {
                    qualified_name,
                    kind,
                    location: decl.location.clone(),
                    first: first.clone(),
                });
            }
        } else {
            self.seen.insert((file, id), decl.location.clone());
        }

        match self.nodes.get_mut(&id) {
            Some(node) => {
                // hint of the earliest declaring location wins
                let earliest = node.locations.first().is_none_or(|first| decl.location < *first);
                if decl.type_hint.is_some() && (node.type_hint.is_none() || earliest) {
                    node.type_hint = decl.type_hint.clone();
                }
                if !node.locations.contains(&decl.location) {
                    node.locations.push(decl.location.clone());
                    node.locations.sort();
                }
                node.declaring_file = node.locations[0].file.clone();
                node.visibility = node.visibility.merge(decl.visibility);
                debug!("Merged partial declaration {} at {}", qualified_name, decl.location);
            }
            None => {
                let name = qualified_name.last().unwrap_or_default().to_string();
                self.nodes.insert(
                    id,
                    Node {
                        id,
                        kind,
                        name,
                        qualified_name,
                        declaring_file: decl.location.file.clone(),
                        locations: vec![decl.location.clone()],
                        visibility: decl.visibility,
                        language,
                        parent: None,
                        arity,
                        type_hint: decl.type_hint.clone(),
                    },
                );
            }
        }

        Ok(Some(id))
    }

    /// Register every declaration of one file; duplicates become diagnostics
    pub fn register_extraction(&mut self, extraction: &Extraction) -> usize {
        self.languages.insert(extraction.language);
        let mut registered = 0;
        for decl in &extraction.declarations {
            match self.register(extraction.language, decl) {
                Ok(Some(_)) => registered += 1,
                Ok(None) => {}
                Err(err) => {
                    debug!("{}", err);
                    self.diagnostics.push(err.into());
                }
            }
        }
        registered
    }

    /// Register the units of a manifest as package/module nodes
    pub fn register_manifest(&mut self, manifest: &DependencyManifest) {
        self.languages.insert(manifest.language);
        for unit in &manifest.units {
            let decl = RawDeclaration::new(
                unit.kind.symbol_kind(),
                unit.name.as_str(),
                QualifiedName::root(),
                unit.location.clone(),
            )
            .with_visibility(Visibility::Public);
            if let Err(err) = self.register(manifest.language, &decl) {
                self.diagnostics.push(err.into());
            }
        }
        self.manifests.push(manifest.clone());
    }

    /// Close the registry: synthesize roots and implicit scopes, link parents,
    /// and produce the read-only table.
    pub fn close(self) -> SymbolTable {
        let Registry {
            project,
            mut nodes,
            languages,
            manifests,
            diagnostics,
            ..
        } = self;

        let mut by_name = name_index(&nodes);

        // Root package per language
        let mut roots = BTreeMap::new();
        for language in languages {
            let qualified_name = QualifiedName::root();
            let id = SymbolId::derive(&project, language, SymbolKind::Package, &qualified_name, None);
            nodes.insert(
                id,
                Node {
                    id,
                    kind: SymbolKind::Package,
                    name: project.clone(),
                    qualified_name,
                    declaring_file: String::new(),
                    locations: Vec::new(),
                    visibility: Visibility::Public,
                    language,
                    parent: None,
                    arity: None,
                    type_hint: None,
                },
            );
            roots.insert(language, id);
        }

        // Implicit modules for undeclared intermediate scopes
        let mut implicit: BTreeMap<(Language, QualifiedName), SourceLocation> = BTreeMap::new();
        for node in nodes.values() {
            let mut scope = node.qualified_name.parent();
            while let Some(current) = scope.filter(|s| !s.is_root()) {
                let known = by_name
                    .get(&node.language)
                    .is_some_and(|names| names.contains_key(&current));
                if known {
                    break;
                }
                if let Some(first) = node.locations.first() {
                    let entry = implicit
                        .entry((node.language, current.clone()))
                        .or_insert_with(|| first.clone());
                    if *first < *entry {
                        *entry = first.clone();
                    }
                }
                scope = current.parent();
            }
        }
        let mut synthesized = BTreeSet::new();
        for ((language, qualified_name), location) in implicit {
            let id = SymbolId::derive(&project, language, SymbolKind::Module, &qualified_name, None);
            synthesized.insert(id);
            let name = qualified_name.last().unwrap_or_default().to_string();
            nodes.insert(
                id,
                Node {
                    id,
                    kind: SymbolKind::Module,
                    name,
                    qualified_name,
                    declaring_file: location.file.clone(),
                    locations: vec![location],
                    visibility: Visibility::Public,
                    language,
                    parent: None,
                    arity: None,
                    type_hint: None,
                },
            );
        }
        by_name = name_index(&nodes);

        // Link parents and emit declares edges
        let mut parents = Vec::with_capacity(nodes.len());
        for node in nodes.values() {
            if node.qualified_name.is_root() {
                continue;
            }
            let parent = container_of(&nodes, &by_name, &roots, node);
            if let Some(parent) = parent {
                parents.push((node.id, parent));
            }
        }

        let mut children: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
        let mut declares = Vec::with_capacity(parents.len());
        for (id, parent) in parents {
            if let Some(node) = nodes.get_mut(&id) {
                node.parent = Some(parent);
                if let Some(location) = node.locations.first() {
                    declares.push(Edge::new(EdgeKind::Declares, parent, id, location.clone()));
                }
            }
            children.entry(parent).or_default().push(id);
        }
        declares.sort();
        for members in children.values_mut() {
            members.sort();
        }

        let mut by_file: BTreeMap<String, Vec<SymbolId>> = BTreeMap::new();
        for node in nodes.values() {
            for location in &node.locations {
                let ids = by_file.entry(location.file.clone()).or_default();
                if ids.last() != Some(&node.id) {
                    ids.push(node.id);
                }
            }
        }

        info!(
            "Registry closed: {} nodes ({} implicit scopes), {} declares edges, {} files",
            nodes.len(),
            synthesized.len(),
            declares.len(),
            by_file.len()
        );

        SymbolTable {
            project,
            nodes,
            by_name,
            by_file,
            children,
            roots,
            implicit: synthesized,
            declares,
            manifests,
            diagnostics,
        }
    }
}

type NameIndex = BTreeMap<Language, HashMap<QualifiedName, Vec<SymbolId>>>;

fn name_index(nodes: &BTreeMap<SymbolId, Node>) -> NameIndex {
    let mut index: NameIndex = BTreeMap::new();
    for node in nodes.values() {
        index
            .entry(node.language)
            .or_default()
            .entry(node.qualified_name.clone())
            .or_default()
            .push(node.id);
    }
    index
}

/// Nearest enclosing container; types win over modules sharing a name
fn container_of(
    nodes: &BTreeMap<SymbolId, Node>,
    by_name: &NameIndex,
    roots: &BTreeMap<Language, SymbolId>,
    node: &Node,
) -> Option<SymbolId> {
    let names = by_name.get(&node.language)?;
    let mut scope = node.qualified_name.parent();
    while let Some(current) = scope {
        if current.is_root() {
            return roots.get(&node.language).copied();
        }
        let containers = names
            .get(&current)
            .into_iter()
            .flatten()
            .filter_map(|id| nodes.get(id))
            .filter(|n| n.kind.is_container());
        let best = containers.min_by_key(|n| match n.kind {
            SymbolKind::Type => 0,
            SymbolKind::Module => 1,
            _ => 2,
        });
        if let Some(best) = best {
            return Some(best.id);
        }
        scope = current.parent();
    }
    None
}

/// Outcome of a qualified-name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(SymbolId),
    /// Several nodes share the name (overloads, a type and a namespace)
    Overloaded(Vec<SymbolId>),
    NotFound,
}

impl LookupResult {
    fn from_ids(ids: &[SymbolId]) -> Self {
        match ids {
            [] => LookupResult::NotFound,
            [id] => LookupResult::Found(*id),
            many => {
                let mut ids = many.to_vec();
                ids.sort();
                LookupResult::Overloaded(ids)
            }
        }
    }

    /// Every matching id
    pub fn ids(&self) -> Vec<SymbolId> {
        match self {
            LookupResult::Found(id) => vec![*id],
            LookupResult::Overloaded(ids) => ids.clone(),
            LookupResult::NotFound => Vec::new(),
        }
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        match self {
            LookupResult::Found(found) => *found == id,
            LookupResult::Overloaded(ids) => ids.contains(&id),
            LookupResult::NotFound => false,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, LookupResult::NotFound)
    }
}

/// Closed, read-only symbol table.
#[derive(Debug)]
pub struct SymbolTable {
    project: String,
    nodes: BTreeMap<SymbolId, Node>,
    by_name: NameIndex,
    by_file: BTreeMap<String, Vec<SymbolId>>,
    children: HashMap<SymbolId, Vec<SymbolId>>,
    roots: BTreeMap<Language, SymbolId>,
    /// Modules synthesized for undeclared intermediate scopes
    implicit: BTreeSet<SymbolId>,
    declares: Vec<Edge>,
    manifests: Vec<DependencyManifest>,
    diagnostics: Vec<Diagnostic>,
}

impl SymbolTable {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn node(&self, id: SymbolId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether the node is a module no source declared
    pub fn is_implicit(&self, id: SymbolId) -> bool {
        self.implicit.contains(&id)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exact-name match, every kind
    pub fn named(&self, language: Language, name: &QualifiedName) -> &[SymbolId] {
        self.by_name
            .get(&language)
            .and_then(|names| names.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a qualified name.
    ///
    /// Exact match first, then relative to `scope_hint`, stripping its
    /// innermost segment on every retry.
    pub fn lookup(&self, language: Language, name: &QualifiedName, scope_hint: &QualifiedName) -> LookupResult {
        let exact = self.named(language, name);
        if !exact.is_empty() {
            return LookupResult::from_ids(exact);
        }
        for scope in scope_hint.ancestors().filter(|s| !s.is_root()) {
            let ids = self.named(language, &scope.join(name));
            if !ids.is_empty() {
                return LookupResult::from_ids(ids);
            }
        }
        LookupResult::NotFound
    }

    /// Nodes with a declaring location in `file`
    pub fn in_file(&self, file: &str) -> &[SymbolId] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that declared at least one node
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.by_file.keys().map(String::as_str)
    }

    /// Direct members of a container
    pub fn members(&self, id: SymbolId) -> &[SymbolId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Members of a container with a given local name
    pub fn members_named(&self, id: SymbolId, name: &str) -> Vec<SymbolId> {
        self.members(id)
            .iter()
            .copied()
            .filter(|member| self.node(*member).is_some_and(|n| n.name == name))
            .collect()
    }

    /// The root package of a language
    pub fn root(&self, language: Language) -> Option<SymbolId> {
        self.roots.get(&language).copied()
    }

    pub fn roots(&self) -> impl Iterator<Item = (Language, SymbolId)> + '_ {
        self.roots.iter().map(|(language, id)| (*language, *id))
    }

    /// `declares` edges, one per non-root node
    pub fn declares(&self) -> &[Edge] {
        &self.declares
    }

    pub fn manifests(&self) -> &[DependencyManifest] {
        &self.manifests
    }

    /// Coverage gaps and duplicates found while registering
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Hand the nodes and `declares` edges over to assembly
    pub fn into_parts(self) -> (BTreeMap<SymbolId, Node>, Vec<Edge>) {
        (self.nodes, self.declares)
    }
}
