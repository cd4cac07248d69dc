//! Cycle detection
//!
//! Runs Tarjan's SCC algorithm over two edge subsets separately:
//! `calls`/`references` (mutual recursion) and `imports` (circular module
//! dependencies, reported as diagnostics).

use super::Graph;
use crate::diagnostics::Diagnostic;
use crate::edge::{Edge, EdgeKind};
use crate::id::SymbolId;
use crate::location::SourceLocation;
use crate::name::QualifiedName;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// One strongly connected set of nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cycle {
    /// Members in id order
    pub members: Vec<SymbolId>,
    /// Earliest edge location inside the cycle
    pub location: SourceLocation,
}

/// Cycles found in a graph, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub call_cycles: Vec<Cycle>,
    pub import_cycles: Vec<Cycle>,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.call_cycles.is_empty() && self.import_cycles.is_empty()
    }
}

impl Graph {
    /// Detect call and import cycles; a node calling itself counts as a cycle
    pub fn cycle_detection(&self) -> CycleReport {
        self.cycle_detection_with(true)
    }

    pub fn cycle_detection_with(&self, include_self_loops: bool) -> CycleReport {
        CycleReport {
            call_cycles: find_cycles(self.edges(), |kind| kind.is_call_like(), include_self_loops),
            import_cycles: find_cycles(self.edges(), |kind| kind == EdgeKind::Imports, include_self_loops),
        }
    }

    /// One `ImportCycle` diagnostic per import cycle
    pub fn import_cycle_diagnostics(&self, report: &CycleReport) -> Vec<Diagnostic> {
        report
            .import_cycles
            .iter()
            .map(|cycle| {
                let mut members: Vec<QualifiedName> = cycle
                    .members
                    .iter()
                    .filter_map(|id| self.node(*id))
                    .map(|node| node.qualified_name.clone())
                    .collect();
                members.sort();
                Diagnostic::ImportCycle {
                    location: cycle.location.clone(),
                    members,
                }
            })
            .collect()
    }
}

fn find_cycles(edges: &[Edge], keep: impl Fn(EdgeKind) -> bool, include_self_loops: bool) -> Vec<Cycle> {
    let mut graph: DiGraph<SymbolId, usize> = DiGraph::new();
    let mut indices: HashMap<SymbolId, NodeIndex> = HashMap::new();
    let mut self_loops = BTreeSet::new();

    for (position, edge) in edges.iter().enumerate() {
        if !keep(edge.kind) {
            continue;
        }
        let Some(target) = edge.target_id() else {
            continue;
        };
        let mut index_of = |id: SymbolId| *indices.entry(id).or_insert_with(|| graph.add_node(id));
        let (from, to) = (index_of(edge.source), index_of(target));
        if from == to {
            self_loops.insert(edge.source);
        }
        graph.add_edge(from, to, position);
    }

    let mut cycles: Vec<Cycle> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || (include_self_loops && self_loops.contains(&graph[scc[0]])))
        .filter_map(|scc| {
            let in_cycle: BTreeSet<NodeIndex> = scc.iter().copied().collect();
            let location = graph
                .edge_indices()
                .filter_map(|e| graph.edge_endpoints(e).map(|(a, b)| (e, a, b)))
                .filter(|(_, a, b)| in_cycle.contains(a) && in_cycle.contains(b))
                .map(|(e, _, _)| edges[graph[e]].location.clone())
                .min()?;
            let mut members: Vec<SymbolId> = scc.iter().map(|i| graph[*i]).collect();
            members.sort();
            Some(Cycle { members, location })
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{build, edge, node};
    use super::*;
    use crate::symbol::SymbolKind;

    #[test]
    fn test_mutual_recursion() {
        let even = node("m.is_even", SymbolKind::Function, "m.py", 1);
        let odd = node("m.is_odd", SymbolKind::Function, "m.py", 5);
        let other = node("m.main", SymbolKind::Function, "m.py", 9);
        let graph = build(
            &[&even, &odd, &other],
            vec![
                edge(EdgeKind::Calls, &even, &odd),
                edge(EdgeKind::Calls, &odd, &even),
                edge(EdgeKind::Calls, &other, &even),
            ],
        );

        let report = graph.cycle_detection();
        assert_eq!(report.call_cycles.len(), 1);
        assert_eq!(report.call_cycles[0].members.len(), 2);
        assert!(!report.call_cycles[0].members.contains(&other.id));
        assert!(report.import_cycles.is_empty());
    }

    #[test]
    fn test_self_loop_is_configurable() {
        let fact = node("m.factorial", SymbolKind::Function, "m.py", 1);
        let graph = build(&[&fact], vec![edge(EdgeKind::Calls, &fact, &fact)]);

        assert_eq!(graph.cycle_detection().call_cycles.len(), 1);
        assert!(graph.cycle_detection_with(false).is_empty());
    }

    #[test]
    fn test_import_cycles_become_diagnostics() {
        let a = node("pkg.a", SymbolKind::Module, "pkg/a.py", 1);
        let b = node("pkg.b", SymbolKind::Module, "pkg/b.py", 1);
        let graph = build(
            &[&a, &b],
            vec![edge(EdgeKind::Imports, &a, &b), edge(EdgeKind::Imports, &b, &a)],
        );

        let report = graph.cycle_detection();
        assert!(report.call_cycles.is_empty());
        assert_eq!(report.import_cycles.len(), 1);

        let diagnostics = graph.import_cycle_diagnostics(&report);
        match &diagnostics[0] {
            Diagnostic::ImportCycle { members, location } => {
                assert_eq!(members, &vec![QualifiedName::parse("pkg.a"), QualifiedName::parse("pkg.b")]);
                assert_eq!(location.file, "pkg/a.py");
            }
            other => panic!("unexpected diagnostic {other}"),
        }
    }
}
