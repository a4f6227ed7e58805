//! Export of the finished region graph.
//!
//! [`GraphWorld`] is the serializable world definition; [`to_dot`] renders it
//! for Graphviz.

use serde::{Deserialize, Serialize};

use super::builder::RegionGraphBuilder;
use crate::core::RequirementBranch;

/// One exit of an exported region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitDefinition {
    /// Target region.
    pub target: String,
    /// Alternative ways to take the exit.
    pub logic: Vec<RequirementBranch>,
}

/// An exported region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDefinition {
    /// Region name.
    pub name: String,
    /// Locations placed in the region, in name order.
    pub locations: Vec<String>,
    /// Exits in insertion order.
    pub exits: Vec<ExitDefinition>,
}

/// An exported location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDefinition {
    /// Location name.
    pub name: String,
    /// Alternative ways to obtain it from inside its region.
    pub logic: Vec<RequirementBranch>,
    /// Whether it is an in-game event.
    #[serde(default)]
    pub event: bool,
}

/// The complete exported graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphWorld {
    /// Root region every absent state provider resolved to.
    pub start_region: String,
    /// Regions with the root first, then in name order.
    pub regions: Vec<RegionDefinition>,
    /// Locations in name order.
    pub locations: Vec<LocationDefinition>,
    /// Transition names whose regions were preserved.
    pub transitions: Vec<String>,
}

impl GraphWorld {
    /// Snapshot the builder's current graph.
    pub fn from_builder(builder: &RegionGraphBuilder) -> Self {
        let root = builder.root();
        let mut regions: Vec<RegionDefinition> = builder
            .regions()
            .map(|region| RegionDefinition {
                name: region.name.clone(),
                locations: region.locations.iter().cloned().collect(),
                exits: region
                    .connections
                    .iter()
                    .map(|c| ExitDefinition {
                        target: c.target.clone(),
                        logic: c.branches.clone(),
                    })
                    .collect(),
            })
            .collect();
        regions.sort_by(|a, b| (a.name != root, &a.name).cmp(&(b.name != root, &b.name)));

        let locations = builder
            .locations()
            .map(|l| LocationDefinition {
                name: l.name.clone(),
                logic: l.branches.clone(),
                event: l.event,
            })
            .collect();

        let transitions = builder
            .transitions()
            .iter()
            .filter(|t| builder.region(t).is_some())
            .cloned()
            .collect();

        Self {
            start_region: root.to_string(),
            regions,
            locations,
            transitions,
        }
    }

    /// Look up an exported region.
    pub fn region(&self, name: &str) -> Option<&RegionDefinition> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Look up an exported location.
    pub fn location(&self, name: &str) -> Option<&LocationDefinition> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Total number of exits across all regions.
    pub fn exit_count(&self) -> usize {
        self.regions.iter().map(|r| r.exits.len()).sum()
    }
}

fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Render the world as a Graphviz digraph.
///
/// Each region is a box labeled with its name and locations; each exit is
/// one edge regardless of how many alternatives it carries.
pub fn to_dot(world: &GraphWorld) -> String {
    let mut lines = vec![
        "digraph world {".to_string(),
        "    node [shape=box];".to_string(),
    ];

    for region in &world.regions {
        let mut label_parts = vec![region.name.as_str()];
        label_parts.extend(region.locations.iter().map(String::as_str));
        let label = quote(&label_parts.join("\n")).replace('\n', "\\n");
        lines.push(format!("    {} [label={}];", quote(&region.name), label));
    }

    for region in &world.regions {
        for exit in &region.exits {
            lines.push(format!("    {} -> {};", quote(&region.name), quote(&exit.target)));
        }
    }

    lines.push("}".to_string());
    lines.join("\n") + "\n"
}
