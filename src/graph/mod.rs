//! Symbol Graph - the assembled, immutable result of a build
//!
//! Nodes come from the closed registry, edges from the registry (`declares`)
//! and the resolver. Assembly validates that every edge endpoint names a
//! registered node; a dangling id means an engine bug and aborts the build.

pub mod cycles;
pub mod diff;
pub mod export;

pub use cycles::{Cycle, CycleReport};
pub use diff::GraphDiff;
pub use export::{EdgeRow, GraphTable, NodeRow};

use crate::edge::{Edge, EdgeKind};
use crate::id::SymbolId;
use crate::language::Language;
use crate::name::QualifiedName;
use crate::symbol::{Node, SymbolKind};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::info;

/// Immutable symbol graph with query indexes.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: BTreeMap<SymbolId, Node>,
    /// Sorted, deduplicated
    edges: Vec<Edge>,
    /// Edge positions by source
    edges_from: HashMap<SymbolId, Vec<usize>>,
    /// Edge positions by resolved target
    edges_to: HashMap<SymbolId, Vec<usize>>,
    nodes_by_file: BTreeMap<String, Vec<SymbolId>>,
    nodes_by_name: HashMap<(Language, QualifiedName), Vec<SymbolId>>,
}

impl Graph {
    /// Assemble nodes and edges into a graph.
    ///
    /// Fails with [`Error::Structural`] when an edge names an id that was
    /// never registered.
    pub fn assemble(nodes: BTreeMap<SymbolId, Node>, mut edges: Vec<Edge>) -> Result<Self> {
        for edge in &edges {
            let missing = std::iter::once(edge.source)
                .chain(edge.target_id())
                .find(|id| !nodes.contains_key(id));
            if let Some(missing) = missing {
                return Err(Error::Structural {
                    kind: edge.kind,
                    missing,
                    location: edge.location.clone(),
                });
            }
        }

        edges.sort();
        edges.dedup();

        let mut edges_from: HashMap<SymbolId, Vec<usize>> = HashMap::new();
        let mut edges_to: HashMap<SymbolId, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            edges_from.entry(edge.source).or_default().push(i);
            if let Some(target) = edge.target_id() {
                edges_to.entry(target).or_default().push(i);
            }
        }

        let mut nodes_by_file: BTreeMap<String, Vec<SymbolId>> = BTreeMap::new();
        let mut nodes_by_name: HashMap<(Language, QualifiedName), Vec<SymbolId>> = HashMap::new();
        for node in nodes.values() {
            let files: BTreeSet<&str> = node.locations.iter().map(|l| l.file.as_str()).collect();
            for file in files {
                nodes_by_file.entry(file.to_string()).or_default().push(node.id);
            }
            nodes_by_name
                .entry((node.language, node.qualified_name.clone()))
                .or_default()
                .push(node.id);
        }

        let graph = Self {
            nodes,
            edges,
            edges_from,
            edges_to,
            nodes_by_file,
            nodes_by_name,
        };
        info!("Graph assembled: {} nodes, {} edges", graph.nodes.len(), graph.edges.len());
        Ok(graph)
    }

    /// Get a node by id
    pub fn node(&self, id: SymbolId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in sort order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Nodes with an exact qualified name (several for overloads)
    pub fn lookup(&self, language: Language, name: &QualifiedName) -> Vec<&Node> {
        self.nodes_by_name
            .get(&(language, name.clone()))
            .map(|ids| self.resolve_ids(ids))
            .unwrap_or_default()
    }

    /// Get all nodes declared in a file
    pub fn nodes_in_file(&self, file: &str) -> Vec<&Node> {
        self.nodes_by_file
            .get(file)
            .map(|ids| self.resolve_ids(ids))
            .unwrap_or_default()
    }

    /// Files that declare at least one node
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.nodes_by_file.keys().map(String::as_str)
    }

    /// Get outgoing edges from a node
    pub fn edges_from(&self, id: SymbolId) -> Vec<&Edge> {
        self.edges_at(self.edges_from.get(&id))
    }

    /// Get incoming edges to a node
    pub fn edges_to(&self, id: SymbolId) -> Vec<&Edge> {
        self.edges_at(self.edges_to.get(&id))
    }

    /// Get outgoing edges of a specific kind
    pub fn edges_from_by_kind(&self, id: SymbolId, kind: EdgeKind) -> Vec<&Edge> {
        self.edges_from(id).into_iter().filter(|e| e.kind == kind).collect()
    }

    /// Get incoming edges of a specific kind
    pub fn edges_to_by_kind(&self, id: SymbolId, kind: EdgeKind) -> Vec<&Edge> {
        self.edges_to(id).into_iter().filter(|e| e.kind == kind).collect()
    }

    /// Find all callers of a node
    pub fn callers_of(&self, id: SymbolId) -> Vec<&Node> {
        self.sources_of(self.edges_to_by_kind(id, EdgeKind::Calls))
    }

    /// Find all callees of a node
    pub fn callees_of(&self, id: SymbolId) -> Vec<&Node> {
        self.targets_of(self.edges_from_by_kind(id, EdgeKind::Calls))
    }

    /// Types that inherit from or implement a type
    pub fn subclasses_of(&self, id: SymbolId) -> Vec<&Node> {
        let edges = self.edges_to(id).into_iter().filter(|e| e.kind.is_hierarchy()).collect();
        self.sources_of(edges)
    }

    /// Base types and interfaces of a type
    pub fn superclasses_of(&self, id: SymbolId) -> Vec<&Node> {
        let edges = self.edges_from(id).into_iter().filter(|e| e.kind.is_hierarchy()).collect();
        self.targets_of(edges)
    }

    /// Declared members of a container
    pub fn members_of(&self, id: SymbolId) -> Vec<&Node> {
        self.targets_of(self.edges_from_by_kind(id, EdgeKind::Declares))
    }

    /// Nearest base-type methods that a method overrides
    ///
    /// Walks up the type hierarchy from the method's owner and stops each
    /// branch at the first type declaring a callable of the same name.
    pub fn overrides_of(&self, id: SymbolId) -> Vec<&Node> {
        self.override_walk(id, true)
    }

    /// Nearest derived-type methods that override a method
    pub fn overridden_by(&self, id: SymbolId) -> Vec<&Node> {
        self.override_walk(id, false)
    }

    fn owner_type(&self, id: SymbolId) -> Option<SymbolId> {
        self.edges_to_by_kind(id, EdgeKind::Declares)
            .into_iter()
            .map(|e| e.source)
            .find(|source| self.node(*source).is_some_and(|n| n.kind == SymbolKind::Type))
    }

    fn override_walk(&self, id: SymbolId, upward: bool) -> Vec<&Node> {
        let Some(method) = self.node(id).filter(|n| n.kind.is_callable()) else {
            return Vec::new();
        };
        let Some(owner) = self.owner_type(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([owner]);
        let mut queue = VecDeque::from([owner]);
        let mut found = BTreeSet::new();
        while let Some(current) = queue.pop_front() {
            let next = if upward {
                self.superclasses_of(current)
            } else {
                self.subclasses_of(current)
            };
            for ty in next {
                if !visited.insert(ty.id) {
                    continue;
                }
                let same_name: Vec<SymbolId> = self
                    .members_of(ty.id)
                    .into_iter()
                    .filter(|m| m.kind.is_callable() && m.name == method.name)
                    .map(|m| m.id)
                    .collect();
                if same_name.is_empty() {
                    queue.push_back(ty.id);
                } else {
                    found.extend(same_name);
                }
            }
        }
        found.into_iter().filter_map(|id| self.node(id)).collect()
    }

    /// Every node that depends on `id`, directly or transitively
    pub fn transitive_dependents(&self, id: SymbolId) -> Vec<&Node> {
        self.impact(id, usize::MAX)
    }

    /// Perform impact analysis - find all nodes affected by changes to this node
    ///
    /// Breadth-first over reverse dependency edges (everything but
    /// `declares`) up to `depth` levels. The start node is never included.
    pub fn impact(&self, id: SymbolId, depth: usize) -> Vec<&Node> {
        let mut visited = HashSet::from([id]);
        let mut queue = VecDeque::from([(id, 0usize)]);
        let mut affected = Vec::new();

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }
            for edge in self.edges_to(current) {
                if edge.kind.is_dependency() && visited.insert(edge.source) {
                    affected.push(edge.source);
                    queue.push_back((edge.source, current_depth + 1));
                }
            }
        }

        affected.sort();
        self.resolve_ids(&affected)
    }

    /// Nodes and edges reachable from `id` over the given edge kinds, in
    /// either direction, up to `depth` hops.
    pub fn related_subgraph(&self, id: SymbolId, kinds: &[EdgeKind], depth: usize) -> Subgraph<'_> {
        let mut visited = BTreeSet::from([id]);
        let mut edge_set = BTreeSet::new();
        let mut queue = VecDeque::from([(id, 0usize)]);

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }
            let outgoing = self.edges_from.get(&current).into_iter().flatten();
            let incoming = self.edges_to.get(&current).into_iter().flatten();
            for &i in outgoing.chain(incoming) {
                let edge = &self.edges[i];
                if !kinds.contains(&edge.kind) {
                    continue;
                }
                edge_set.insert(i);
                let Some(target) = edge.target_id() else {
                    continue;
                };
                let other = if edge.source == current { target } else { edge.source };
                if visited.insert(other) {
                    queue.push_back((other, current_depth + 1));
                }
            }
        }

        Subgraph {
            nodes: visited.iter().filter_map(|id| self.nodes.get(id)).collect(),
            edges: edge_set.into_iter().map(|i| &self.edges[i]).collect(),
        }
    }

    /// Edges from nodes in other files into nodes declared in `file`
    pub fn cross_file_edges(&self, file: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| edge.kind.is_dependency())
            .filter(|edge| {
                let target = edge.target_id().and_then(|id| self.nodes.get(&id));
                let source = self.nodes.get(&edge.source);
                match (source, target) {
                    (Some(source), Some(target)) => target.is_declared_in(file) && !source.is_declared_in(file),
                    _ => false,
                }
            })
            .collect()
    }

    /// Edges bound to an unresolved target
    pub fn unresolved_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|edge| !edge.is_resolved()).collect()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut edges_by_kind = BTreeMap::new();
        for edge in &self.edges {
            *edges_by_kind.entry(edge.kind).or_insert(0) += 1;
        }
        let unresolved_edges = self.edges.iter().filter(|e| !e.is_resolved()).count();
        let mut nodes_by_language = BTreeMap::new();
        for node in self.nodes.values() {
            *nodes_by_language.entry(node.language).or_insert(0) += 1;
        }

        GraphStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            resolved_edges: self.edges.len() - unresolved_edges,
            unresolved_edges,
            visibility_violations: self.edges.iter().filter(|e| e.visibility_violation).count(),
            files: self.nodes_by_file.len(),
            edges_by_kind,
            nodes_by_language,
        }
    }

    fn resolve_ids(&self, ids: &[SymbolId]) -> Vec<&Node> {
        ids.iter().filter_map(|id| self.nodes.get(id)).collect()
    }

    fn edges_at(&self, positions: Option<&Vec<usize>>) -> Vec<&Edge> {
        positions
            .map(|positions| positions.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    fn sources_of(&self, edges: Vec<&Edge>) -> Vec<&Node> {
        let ids: BTreeSet<SymbolId> = edges.iter().map(|e| e.source).collect();
        ids.iter().filter_map(|id| self.nodes.get(id)).collect()
    }

    fn targets_of(&self, edges: Vec<&Edge>) -> Vec<&Node> {
        let ids: BTreeSet<SymbolId> = edges.iter().filter_map(|e| e.target_id()).collect();
        ids.iter().filter_map(|id| self.nodes.get(id)).collect()
    }
}

/// A connected slice of the graph
#[derive(Debug, Clone)]
pub struct Subgraph<'g> {
    pub nodes: Vec<&'g Node>,
    pub edges: Vec<&'g Edge>,
}

/// Statistics about a symbol graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub resolved_edges: usize,
    pub unresolved_edges: usize,
    pub visibility_violations: usize,
    pub files: usize,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
    pub nodes_by_language: BTreeMap<Language, usize>,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Symbol Graph Statistics:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Nodes: {}", self.total_nodes)?;
        for (language, count) in &self.nodes_by_language {
            writeln!(f, "    {}: {}", language, count)?;
        }
        writeln!(f, "  Edges: {} (resolved: {}, unresolved: {})",
            self.total_edges, self.resolved_edges, self.unresolved_edges)?;
        for (kind, count) in &self.edges_by_kind {
            writeln!(f, "    {}: {}", kind, count)?;
        }
        write!(f, "  Visibility violations: {}", self.visibility_violations)
    }
}
