//! End-to-end compilation of a logic document into a graph world.
//!
//! Objects are ordered by the waypoint reference graph, ingested into a
//! [`RegionGraphBuilder`], validated, cleaned and exported.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::graph::{CleanupOptions, CleanupReport, GraphWorld, LogicObject, RegionGraphBuilder};
use crate::input::InputDocument;
use crate::waypoint::{processing_order, WaypointReferenceGraph};

/// Settings for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Root region used when the document names no start.
    pub root: String,
    /// Regions that survive cleanup, in addition to the document's list.
    pub keep_regions: Vec<String>,
    pub cleanup: CleanupOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CompileOptions {
    /// Take root, keep-list and cleanup switches from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.cleanup.root.clone(),
            keep_regions: config.cleanup.keep_regions.clone(),
            cleanup: config.cleanup_options(),
        }
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub world: GraphWorld,
    pub report: CleanupReport,
    /// Groups of objects whose logic refers to each other.
    pub cycle_groups: Vec<BTreeSet<String>>,
}

/// Compile a parsed document.
pub fn compile(document: &InputDocument, options: &CompileOptions) -> Result<Compilation> {
    let objects = document.to_logic_objects()?;
    let root = document
        .start
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&options.root);

    let mut keep: BTreeSet<String> = options.keep_regions.iter().cloned().collect();
    keep.extend(document.keep_regions.iter().cloned());

    compile_objects(&objects, root, keep, &options.cleanup)
}

/// Compile already decoded objects.
///
/// Every name is declared before ingestion, so a clause may mention objects
/// defined later in the list.
pub fn compile_objects(
    objects: &[LogicObject],
    root: &str,
    keep_regions: BTreeSet<String>,
    cleanup: &CleanupOptions,
) -> Result<Compilation> {
    info!(objects = objects.len(), root, "compiling logic");

    let references = WaypointReferenceGraph::from_objects(objects);
    let order = processing_order(&references);
    let cycle_groups: Vec<BTreeSet<String>> = order
        .iter()
        .filter(|group| group.requires_joint_resolution)
        .map(|group| group.members.iter().cloned().collect())
        .collect();
    if !cycle_groups.is_empty() {
        warn!(
            groups = cycle_groups.len(),
            "logic contains mutually referencing objects"
        );
    }

    let by_name: BTreeMap<&str, &LogicObject> =
        objects.iter().map(|o| (o.name.as_str(), o)).collect();

    let mut builder = RegionGraphBuilder::new(root).with_keep_regions(keep_regions);
    builder.declare(objects.iter().map(|o| o.name.clone()));

    for group in &order {
        if group.requires_joint_resolution {
            debug!(members = ?group.members, "ingesting cyclic group");
        }
        for name in &group.members {
            if let Some(object) = by_name.get(name.as_str()) {
                builder.ingest(object)?;
            }
        }
    }
    info!(regions = builder.regions().count(), "ingestion finished");

    builder.validate()?;

    let report = builder.clean(cleanup);
    let world = GraphWorld::from_builder(&builder);
    info!(
        regions = world.regions.len(),
        exits = world.exit_count(),
        locations = world.locations.len(),
        "graph world exported"
    );

    Ok(Compilation {
        world,
        report,
        cycle_groups,
    })
}
