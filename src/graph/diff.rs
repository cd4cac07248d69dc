//! Graph diffing for incremental reporting
//!
//! Because symbol ids are content-derived, two builds of the same project can
//! be compared id-for-id: a node that did not change keeps its id.

use super::Graph;
use crate::edge::Edge;
use crate::id::SymbolId;
use std::collections::BTreeSet;

/// The result of comparing two graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDiff {
    pub added_nodes: Vec<SymbolId>,
    pub removed_nodes: Vec<SymbolId>,
    pub added_edges: Vec<Edge>,
    pub removed_edges: Vec<Edge>,
}

impl GraphDiff {
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}

impl std::fmt::Display for GraphDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nodes +{} -{}, edges +{} -{}",
            self.added_nodes.len(),
            self.removed_nodes.len(),
            self.added_edges.len(),
            self.removed_edges.len()
        )
    }
}

impl Graph {
    /// Changes needed to turn `previous` into `self`
    pub fn diff(&self, previous: &Graph) -> GraphDiff {
        let current_nodes: BTreeSet<SymbolId> = self.nodes().map(|n| n.id).collect();
        let previous_nodes: BTreeSet<SymbolId> = previous.nodes().map(|n| n.id).collect();
        let current_edges: BTreeSet<&Edge> = self.edges().iter().collect();
        let previous_edges: BTreeSet<&Edge> = previous.edges().iter().collect();

        GraphDiff {
            added_nodes: current_nodes.difference(&previous_nodes).copied().collect(),
            removed_nodes: previous_nodes.difference(&current_nodes).copied().collect(),
            added_edges: current_edges.difference(&previous_edges).map(|e| (*e).clone()).collect(),
            removed_edges: previous_edges.difference(&current_edges).map(|e| (*e).clone()).collect(),
        }
    }
}
