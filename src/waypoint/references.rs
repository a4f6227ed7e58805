//! Reference graph over named logic objects.
//!
//! An edge `A → B` means the logic of `A` mentions `B`, so `B` has to be
//! understood before `A`. Paths are expanded exhaustively from every root to
//! find definitions that refer back to themselves.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::Term;
use crate::graph::LogicObject;

/// A node's outgoing references and derived incoming referrers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceNode {
    /// Names this node's logic mentions.
    pub references: BTreeSet<String>,
    /// Names whose logic mentions this node.
    pub referrers: BTreeSet<String>,
}

/// A maximal path found by [`WaypointReferenceGraph::to_paths`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReferencePath {
    /// Names along the path. A cyclic path ends with a repeated name.
    pub names: Vec<String>,
    /// Whether the path stopped because it revisited a name.
    pub cyclic: bool,
}

/// Dependency graph over logic object names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaypointReferenceGraph {
    nodes: BTreeMap<String, ReferenceNode>,
}

impl WaypointReferenceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from logic objects.
    ///
    /// References are the declared object names a clause uses as its state
    /// provider or as a simple condition. Self-references are left out: a
    /// clause continuing from its own object's state is not a dependency.
    pub fn from_objects(objects: &[LogicObject]) -> Self {
        let declared: BTreeSet<&str> = objects.iter().map(|o| o.name.as_str()).collect();
        let mut graph = Self::new();

        for object in objects {
            let mut references = BTreeSet::new();
            for clause in &object.clauses {
                if let Some(provider) = &clause.provider {
                    references.insert(provider.as_str());
                }
                for term in &clause.conditions {
                    if let Term::Simple(name) = term {
                        references.insert(name.as_str());
                    }
                }
            }
            references.retain(|r| *r != object.name && declared.contains(r));
            graph.update(&object.name, references);
        }

        graph
    }

    /// Insert or replace a node's outgoing references.
    ///
    /// Referenced names that are not nodes yet are created. A node is a root
    /// exactly while nothing references it.
    pub fn update<I, S>(&mut self, name: &str, references: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let previous = std::mem::take(&mut self.nodes.entry(name.to_string()).or_default().references);
        for old in &previous {
            if let Some(node) = self.nodes.get_mut(old) {
                node.referrers.remove(name);
            }
        }

        let references: BTreeSet<String> = references.into_iter().map(Into::into).collect();
        for target in &references {
            self.nodes
                .entry(target.clone())
                .or_default()
                .referrers
                .insert(name.to_string());
        }

        if let Some(node) = self.nodes.get_mut(name) {
            node.references = references;
        }
    }

    /// Look up a node.
    pub fn node(&self, name: &str) -> Option<&ReferenceNode> {
        self.nodes.get(name)
    }

    /// Node names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `name` is a node nothing refers to.
    pub fn is_root(&self, name: &str) -> bool {
        self.nodes
            .get(name)
            .is_some_and(|node| node.referrers.is_empty())
    }

    /// All root names in order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.referrers.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The same graph with every edge reversed.
    pub fn inverse(&self) -> Self {
        let nodes = self
            .nodes
            .iter()
            .map(|(name, node)| {
                (
                    name.clone(),
                    ReferenceNode {
                        references: node.referrers.clone(),
                        referrers: node.references.clone(),
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    /// Expand every path from every root.
    ///
    /// A path ends when it reaches a node without references (complete) or
    /// when its next step revisits a name already on it (cyclic, with the
    /// repeated name appended). Nodes no root reaches are expanded from the
    /// first unvisited name, so cycles without an outside referrer are found
    /// too. Returns the deduplicated paths in order.
    pub fn to_paths(&self) -> Vec<ReferencePath> {
        let mut paths = BTreeSet::new();
        let mut visited = BTreeSet::new();

        for root in self.roots() {
            self.expand_from(root, &mut visited, &mut paths);
        }

        loop {
            let next = self.nodes.keys().find(|name| !visited.contains(name.as_str()));
            let Some(start) = next else {
                break;
            };
            self.expand_from(start, &mut visited, &mut paths);
        }

        paths.into_iter().collect()
    }

    fn expand_from<'a>(
        &'a self,
        start: &'a str,
        visited: &mut BTreeSet<&'a str>,
        paths: &mut BTreeSet<ReferencePath>,
    ) {
        let mut stack: Vec<Vec<&'a str>> = vec![vec![start]];

        while let Some(path) = stack.pop() {
            let Some(&last) = path.last() else {
                continue;
            };
            visited.insert(last);

            let references = self
                .nodes
                .get(last)
                .map(|node| &node.references)
                .filter(|refs| !refs.is_empty());

            let Some(references) = references else {
                paths.insert(ReferencePath {
                    names: path.iter().map(|n| n.to_string()).collect(),
                    cyclic: false,
                });
                continue;
            };

            for next in references {
                let mut extended = path.clone();
                extended.push(next.as_str());
                if path.contains(&next.as_str()) {
                    paths.insert(ReferencePath {
                        names: extended.iter().map(|n| n.to_string()).collect(),
                        cyclic: true,
                    });
                } else {
                    stack.push(extended);
                }
            }
        }
    }

    /// Only the cyclic paths of [`to_paths`](Self::to_paths).
    pub fn find_cycles(&self) -> Vec<ReferencePath> {
        self.to_paths().into_iter().filter(|p| p.cyclic).collect()
    }

    /// Distinct sets of names that take part in a cycle together.
    pub fn cycle_groups(&self) -> Vec<BTreeSet<String>> {
        group_cycles(&self.find_cycles())
    }
}

/// Distinct cycle groups of already expanded paths.
pub fn group_cycles(paths: &[ReferencePath]) -> Vec<BTreeSet<String>> {
    let groups: BTreeSet<BTreeSet<String>> = paths
        .iter()
        .filter_map(largest_cycle_group)
        .map(|group| group.into_iter().collect())
        .collect();
    groups.into_iter().collect()
}

/// The repeating segment of a cyclic path.
///
/// For `[A, B, C, D, B]` this is `[B, C, D]`. Returns `None` for paths that
/// are not cyclic.
pub fn largest_cycle_group(path: &ReferencePath) -> Option<Vec<String>> {
    if !path.cyclic {
        return None;
    }
    let (repeated, body) = path.names.split_last()?;
    let start = body.iter().position(|n| n == repeated)?;
    Some(body[start..].to_vec())
}
