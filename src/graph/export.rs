//! Node/edge table export
//!
//! A flat, serde-friendly view of the graph for external tools. Rows come out
//! in the graph's deterministic order.

use super::Graph;
use crate::edge::{EdgeKind, EdgeTarget, UnresolvedReason};
use crate::language::Language;
use crate::symbol::{SymbolKind, Visibility};
use crate::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub id: String,
    pub kind: SymbolKind,
    pub name: String,
    pub qualified_name: String,
    pub language: Language,
    pub visibility: Visibility,
    pub file: String,
    pub line: u32,
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRow {
    pub source: String,
    pub kind: EdgeKind,
    /// Target id when resolved
    pub target: Option<String>,
    /// Raw target expression when unresolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnresolvedReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub visibility_violation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphTable {
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
}

impl Graph {
    pub fn to_table(&self) -> GraphTable {
        let nodes = self
            .nodes()
            .map(|node| {
                let first = node.locations.first();
                NodeRow {
                    id: node.id.to_string(),
                    kind: node.kind,
                    name: node.name.clone(),
                    qualified_name: node.qualified_name.to_string(),
                    language: node.language,
                    visibility: node.visibility,
                    file: node.declaring_file.clone(),
                    line: first.map(|l| l.line).unwrap_or_default(),
                    parent: node.parent.map(|p| p.to_string()),
                    arity: node.arity,
                }
            })
            .collect();

        let edges = self
            .edges()
            .iter()
            .map(|edge| {
                let (target, unresolved, reason, candidates) = match &edge.target {
                    EdgeTarget::Node(id) => (Some(id.to_string()), None, None, Vec::new()),
                    EdgeTarget::Unresolved(t) => (
                        None,
                        Some(t.raw_name.clone()),
                        Some(t.reason),
                        t.candidates.iter().map(ToString::to_string).collect(),
                    ),
                };
                EdgeRow {
                    source: edge.source.to_string(),
                    kind: edge.kind,
                    target,
                    unresolved,
                    reason,
                    candidates,
                    file: edge.location.file.clone(),
                    line: edge.location.line,
                    column: edge.location.column,
                    visibility_violation: edge.visibility_violation,
                }
            })
            .collect();

        GraphTable { nodes, edges }
    }

    /// Export the node/edge table as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_table())?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build, edge, node};
    use crate::edge::{Edge, UnresolvedTarget};
    use crate::location::SourceLocation;
    use super::*;

    #[test]
    fn test_table_rows() {
        let a = node("m.a", SymbolKind::Function, "m.py", 1);
        let b = node("m.b", SymbolKind::Function, "m.py", 4);
        let external = Edge::unresolved(
            EdgeKind::Calls,
            a.id,
            UnresolvedTarget::new("requests.get", UnresolvedReason::ExternalDependency),
            SourceLocation::new("m.py", 2, 5),
        );
        let graph = build(&[&a, &b], vec![edge(EdgeKind::Calls, &a, &b), external]);

        let table = graph.to_table();
        assert_eq!(table.nodes.len(), 2);
        assert_eq!(table.edges.len(), 2);
        let unresolved = table.edges.iter().find(|e| e.target.is_none()).unwrap();
        assert_eq!(unresolved.unresolved.as_deref(), Some("requests.get"));
        assert_eq!(unresolved.reason, Some(UnresolvedReason::ExternalDependency));
    }

    #[test]
    fn test_json_export() {
        let a = node("m.a", SymbolKind::Function, "m.py", 1);
        let graph = build(&[&a], Vec::new());
        let json: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(json["nodes"][0]["qualified_name"], "m.a");
        assert_eq!(json["nodes"][0]["kind"], a.kind.as_str());
        assert!(json["edges"].as_array().unwrap().is_empty());
    }
}
