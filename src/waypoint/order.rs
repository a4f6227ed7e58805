//! Dependency-first processing order over the reference graph.
//!
//! Names are grouped into strongly connected components. Each group comes
//! after every group it references, so substitution can proceed front to
//! back; multi-member groups have to be resolved together.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use super::references::WaypointReferenceGraph;

/// Names that must be processed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingGroup {
    /// Member names in order.
    pub members: Vec<String>,
    /// Whether members refer to each other (or to themselves) and cannot be
    /// resolved by plain substitution.
    pub requires_joint_resolution: bool,
}

fn to_digraph(graph: &WaypointReferenceGraph) -> DiGraphMap<&str, ()> {
    let mut digraph = DiGraphMap::with_capacity(graph.len(), 0);
    for name in graph.names() {
        digraph.add_node(name);
    }
    for name in graph.names() {
        if let Some(node) = graph.node(name) {
            for target in &node.references {
                digraph.add_edge(name, target.as_str(), ());
            }
        }
    }
    digraph
}

/// Group the graph's names and order the groups dependencies first.
///
/// Edges point from a name to the names it references, so the reverse
/// topological order of the components is already dependencies first.
pub fn processing_order(graph: &WaypointReferenceGraph) -> Vec<ProcessingGroup> {
    let digraph = to_digraph(graph);

    tarjan_scc(&digraph)
        .into_iter()
        .map(|component| {
            let requires_joint_resolution = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&name| digraph.contains_edge(name, name));
            let mut members: Vec<String> = component.into_iter().map(str::to_string).collect();
            members.sort();
            ProcessingGroup {
                members,
                requires_joint_resolution,
            }
        })
        .collect()
}
