//! Region graph builder.
//!
//! The builder owns every region and location node. Logic objects are
//! ingested into edges, the result is validated, and a cleanup fixpoint
//! merges single-parent leaf regions into their parents while pruning
//! dominated logic alternatives.
//!
//! Nodes live in name-keyed maps so merging is a map removal. Parent links
//! are kept in a separate child → parents index instead of on the regions.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::model::{Connection, GraphLocation, LogicObject, ObjectKind, Region};
use crate::core::{cross_combine, eliminate_redundant, RequirementBranch};
use crate::error::{RegraphError, Result};

/// Name of the implicit root region.
pub const DEFAULT_ROOT: &str = "Menu";

/// Switches for the optional tail of the cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Drop always-satisfied branches from lists with other alternatives.
    pub strip_empty_branches: bool,
    /// Remove regions left without locations or exits.
    pub prune_dead_regions: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            strip_empty_branches: true,
            prune_dead_regions: true,
        }
    }
}

/// What the cleanup pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Number of rounds that merged at least one region.
    pub merge_rounds: usize,
    /// Regions merged into their parent, in merge order.
    pub merged_regions: Vec<String>,
    /// Branches removed as dominated.
    pub removed_branches: usize,
    /// Dead-end regions removed after merging.
    pub pruned_regions: Vec<String>,
}

/// Builds and simplifies the region graph.
#[derive(Debug, Clone)]
pub struct RegionGraphBuilder {
    root: String,
    regions: BTreeMap<String, Region>,
    parents: BTreeMap<String, BTreeSet<String>>,
    locations: BTreeMap<String, GraphLocation>,
    transitions: BTreeSet<String>,
    keep: BTreeSet<String>,
    known_objects: BTreeSet<String>,
}

impl Default for RegionGraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl RegionGraphBuilder {
    /// Create a builder whose root region is `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut regions = BTreeMap::new();
        regions.insert(root.clone(), Region::new(root.clone()));
        Self {
            root,
            regions,
            parents: BTreeMap::new(),
            locations: BTreeMap::new(),
            transitions: BTreeSet::new(),
            keep: BTreeSet::new(),
            known_objects: BTreeSet::new(),
        }
    }

    /// Exempt regions from merging and dead-region pruning.
    pub fn with_keep_regions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep.extend(names.into_iter().map(Into::into));
        self
    }

    /// Name of the root region.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Declare logic object names so clauses can tell location requirements
    /// from item requirements. Call before ingesting.
    pub fn declare<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_objects.extend(names.into_iter().map(Into::into));
    }

    /// Ingest one logic object and its clauses.
    pub fn ingest(&mut self, object: &LogicObject) -> Result<()> {
        self.known_objects.insert(object.name.clone());
        self.ensure_region(&object.name);

        match object.kind {
            ObjectKind::Location => self.add_location(&object.name, &object.name, object.event),
            ObjectKind::Transition => {
                self.transitions.insert(object.name.clone());
            }
            ObjectKind::Default => {}
        }

        for clause in &object.clauses {
            let parent = clause.provider.as_deref().unwrap_or(&self.root).to_string();
            if parent == object.name {
                debug!(object = %object.name, "skipping self-provided clause");
                continue;
            }

            let terms = clause.partition(&object.name, &self.known_objects)?;
            let branch = RequirementBranch {
                item_requirements: terms.items,
                location_requirements: terms.locations,
                region_requirements: BTreeSet::new(),
                state_modifiers: clause.modifiers.clone(),
            };
            self.connect(&parent, &object.name, branch);
        }

        debug!(
            object = %object.name,
            kind = ?object.kind,
            clauses = object.clauses.len(),
            "ingested logic object"
        );
        Ok(())
    }

    /// Place a location in a region and create its graph node.
    ///
    /// The location starts with a single always-satisfied branch.
    pub fn add_location(&mut self, region: &str, location: &str, event: bool) {
        self.ensure_region(region)
            .locations
            .insert(location.to_string());
        self.locations
            .entry(location.to_string())
            .or_insert_with(|| GraphLocation::new(location, event));
    }

    /// Add `branch` as an alternative on the edge `parent → target`.
    ///
    /// Both regions are created if absent. Alternatives to the same target
    /// share one connection.
    pub fn connect(&mut self, parent: &str, target: &str, branch: RequirementBranch) {
        self.ensure_region(target);
        let source = self.ensure_region(parent);
        match source.connection_to_mut(target) {
            Some(connection) => connection.branches.push(branch),
            None => source.connections.push(Connection {
                target: target.to_string(),
                branches: vec![branch],
            }),
        }
        self.parents
            .entry(target.to_string())
            .or_default()
            .insert(parent.to_string());
    }

    fn ensure_region(&mut self, name: &str) -> &mut Region {
        self.regions
            .entry(name.to_string())
            .or_insert_with(|| Region::new(name))
    }

    /// Look up a region.
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    /// All regions in name order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Look up a graph location.
    pub fn location(&self, name: &str) -> Option<&GraphLocation> {
        self.locations.get(name)
    }

    /// All graph locations in name order.
    pub fn locations(&self) -> impl Iterator<Item = &GraphLocation> {
        self.locations.values()
    }

    /// Regions with an edge into `name`.
    pub fn parents_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.parents.get(name).filter(|p| !p.is_empty())
    }

    /// Names flagged as transitions.
    pub fn transitions(&self) -> &BTreeSet<String> {
        &self.transitions
    }

    /// Whether `name` is exempt from merging because it is a transition.
    pub fn is_transition(&self, name: &str) -> bool {
        self.transitions.contains(name)
    }

    /// Check that every location sits in exactly one region and that the
    /// placed locations match the declared location nodes.
    ///
    /// Every problem is collected before failing.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for region in self.regions.values() {
            for location in &region.locations {
                owners
                    .entry(location.as_str())
                    .or_default()
                    .push(region.name.as_str());
            }
        }

        for (location, regions) in &owners {
            if regions.len() > 1 {
                problems.push(format!(
                    "location {} is placed in regions {}",
                    location,
                    regions.join(", ")
                ));
            }
        }

        for name in self.locations.keys() {
            if !owners.contains_key(name.as_str()) {
                problems.push(format!("location {} is declared but never placed", name));
            }
        }

        for (location, regions) in &owners {
            if !self.locations.contains_key(*location) {
                problems.push(format!(
                    "location {} is placed in {} but has no location node",
                    location,
                    regions.join(", ")
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RegraphError::validation(problems))
        }
    }

    /// One elimination pass over every connection and location.
    ///
    /// Returns the number of removed branches.
    pub fn eliminate_redundant_branches(&mut self) -> usize {
        let mut removed = 0;
        for region in self.regions.values_mut() {
            for connection in &mut region.connections {
                removed += eliminate_redundant(&mut connection.branches);
            }
        }
        for location in self.locations.values_mut() {
            removed += eliminate_redundant(&mut location.branches);
        }
        removed
    }

    /// The single parent `name` would merge into, if it is eligible.
    ///
    /// Eligible regions are not the root, have no exits, are neither
    /// transitions nor kept, and have exactly one parent.
    pub fn merge_parent(&self, name: &str) -> Option<&str> {
        if name == self.root || self.transitions.contains(name) || self.keep.contains(name) {
            return None;
        }

        let region = self.regions.get(name)?;
        if !region.connections.is_empty() {
            return None;
        }

        let parents = self.parents.get(name)?;
        if parents.len() != 1 {
            return None;
        }
        parents
            .iter()
            .next()
            .map(String::as_str)
            .filter(|p| *p != name)
    }

    /// Regions currently eligible for merging, in name order.
    pub fn merge_candidates(&self) -> Vec<String> {
        self.regions
            .keys()
            .filter(|name| self.merge_parent(name).is_some())
            .cloned()
            .collect()
    }

    /// Merge `child` into `parent`: its locations move to the parent with
    /// the parent edge's branches prepended, and the child is discarded.
    fn merge_into_parent(&mut self, child: &str, parent: &str) {
        let Some(child_region) = self.regions.remove(child) else {
            return;
        };
        self.parents.remove(child);

        let edge = self
            .regions
            .get_mut(parent)
            .and_then(|p| p.remove_connection(child))
            .map(|c| c.branches)
            .unwrap_or_default();

        for name in &child_region.locations {
            if let Some(location) = self.locations.get_mut(name) {
                location.branches = cross_combine(&edge, &location.branches);
            }
        }

        if let Some(parent_region) = self.regions.get_mut(parent) {
            parent_region
                .locations
                .extend(child_region.locations.iter().cloned());
        }

        debug!(
            child,
            parent,
            locations = child_region.locations.len(),
            edge_branches = edge.len(),
            "merged region into parent"
        );
    }

    /// Run the cleanup fixpoint.
    ///
    /// Eliminates dominated branches, then merges eligible regions round by
    /// round (eliminating again after each round) until a round merges
    /// nothing. Empty-branch stripping and dead-region pruning follow,
    /// as enabled by `options`.
    pub fn clean(&mut self, options: &CleanupOptions) -> CleanupReport {
        let mut report = CleanupReport {
            removed_branches: self.eliminate_redundant_branches(),
            ..Default::default()
        };

        loop {
            let mut merged_this_round = 0;
            for child in self.merge_candidates() {
                let Some(parent) = self.merge_parent(&child).map(str::to_string) else {
                    continue;
                };
                self.merge_into_parent(&child, &parent);
                report.merged_regions.push(child);
                merged_this_round += 1;
            }

            if merged_this_round == 0 {
                break;
            }
            report.merge_rounds += 1;
            report.removed_branches += self.eliminate_redundant_branches();
        }

        if options.strip_empty_branches {
            self.strip_empty_branches();
        }
        if options.prune_dead_regions {
            report.pruned_regions = self.prune_dead_regions();
        }

        info!(
            rounds = report.merge_rounds,
            merged = report.merged_regions.len(),
            removed_branches = report.removed_branches,
            pruned = report.pruned_regions.len(),
            remaining = self.regions.len(),
            "cleanup finished"
        );
        report
    }

    /// Drop syntactically empty branches from every list that has another
    /// entry. A list made only of empty branches keeps one.
    pub fn strip_empty_branches(&mut self) {
        for region in self.regions.values_mut() {
            for connection in &mut region.connections {
                strip_empty(&mut connection.branches);
            }
        }
        for location in self.locations.values_mut() {
            strip_empty(&mut location.branches);
        }
    }

    /// Remove regions with no locations and no exits, other than the root,
    /// transitions and kept regions, along with the edges into them.
    /// Repeats until nothing else becomes a dead end.
    pub fn prune_dead_regions(&mut self) -> Vec<String> {
        let mut pruned = Vec::new();

        loop {
            let dead: Vec<String> = self
                .regions
                .values()
                .filter(|r| {
                    r.is_dead_end()
                        && r.name != self.root
                        && !self.transitions.contains(&r.name)
                        && !self.keep.contains(&r.name)
                })
                .map(|r| r.name.clone())
                .collect();

            if dead.is_empty() {
                break;
            }

            for name in dead {
                self.regions.remove(&name);
                for parent in self.parents.remove(&name).unwrap_or_default() {
                    if let Some(region) = self.regions.get_mut(&parent) {
                        region.remove_connection(&name);
                    }
                }
                debug!(region = %name, "pruned dead-end region");
                pruned.push(name);
            }
        }

        pruned
    }
}

fn strip_empty(branches: &mut Vec<RequirementBranch>) {
    if branches.len() <= 1 {
        return;
    }
    if branches.iter().all(RequirementBranch::is_empty) {
        branches.truncate(1);
    } else {
        branches.retain(|b| !b.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StatefulClause, Term};

    fn items(names: &[&str]) -> RequirementBranch {
        RequirementBranch::new().with_items(names.iter().copied())
    }

    fn clause(provider: Option<&str>, conditions: &[&str], modifiers: &[&str]) -> StatefulClause {
        StatefulClause::new(
            provider.map(str::to_string),
            conditions.iter().map(|c| Term::parse(c).unwrap()).collect(),
            modifiers.iter().map(|m| m.to_string()).collect(),
        )
    }

    #[test]
    fn test_new_builder_has_root() {
        let builder = RegionGraphBuilder::default();
        assert_eq!(builder.root(), "Menu");
        assert!(builder.region("Menu").is_some());
        assert!(builder.parents_of("Menu").is_none());
    }

    #[test]
    fn test_ingest_location_creates_region_and_node() {
        let mut builder = RegionGraphBuilder::default();
        let apple = LogicObject::new("Apple", ObjectKind::Location)
            .with_clause(clause(None, &["Sword"], &[]));
        builder.ingest(&apple).unwrap();

        let region = builder.region("Apple").unwrap();
        assert!(region.locations.contains("Apple"));
        assert_eq!(
            builder.location("Apple").unwrap().branches,
            vec![RequirementBranch::new()]
        );

        let edge = builder.region("Menu").unwrap().connection_to("Apple").unwrap();
        assert_eq!(edge.branches, vec![items(&["Sword"])]);
        assert!(builder.parents_of("Apple").unwrap().contains("Menu"));
    }

    #[test]
    fn test_ingest_transition_is_flagged() {
        let mut builder = RegionGraphBuilder::default();
        builder
            .ingest(&LogicObject::new("Town[left1]", ObjectKind::Transition))
            .unwrap();
        assert!(builder.is_transition("Town[left1]"));
        assert!(builder.location("Town[left1]").is_none());
    }

    #[test]
    fn test_ingest_partitions_location_requirements() {
        let mut builder = RegionGraphBuilder::default();
        builder.declare(["Ledge", "Apple"]);
        let apple = LogicObject::new("Apple", ObjectKind::Location).with_clause(clause(
            Some("Cliffs"),
            &["Sword", "Ledge", "GRUBS>5"],
            &["$TAKEDAMAGE"],
        ));
        builder.ingest(&apple).unwrap();

        let edge = builder.region("Cliffs").unwrap().connection_to("Apple").unwrap();
        let branch = &edge.branches[0];
        assert_eq!(branch.item_requirements.len(), 2);
        assert!(branch.item_requirements.contains("GRUBS>5"));
        assert!(branch.location_requirements.contains("Ledge"));
        assert_eq!(branch.state_modifiers, vec!["$TAKEDAMAGE"]);
    }

    #[test]
    fn test_ingest_propagates_malformed_terms() {
        let mut builder = RegionGraphBuilder::default();
        let object = LogicObject::new("Apple", ObjectKind::Location)
            .with_clause(clause(None, &["LEFTSLASH?FALSE"], &[]));
        let err = builder.ingest(&object).unwrap_err();
        assert!(matches!(err, RegraphError::MalformedTerm { .. }));
    }

    #[test]
    fn test_connect_appends_alternatives_to_one_connection() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Ledge", items(&["Sword"]));
        builder.connect("Menu", "Ledge", items(&["Lantern"]));
        builder.connect("Menu", "Cliffs", items(&[]));

        let menu = builder.region("Menu").unwrap();
        assert_eq!(menu.connections.len(), 2);
        assert_eq!(menu.connections[0].target, "Ledge");
        assert_eq!(menu.connections[0].branches.len(), 2);
        assert_eq!(menu.connections[1].target, "Cliffs");
    }

    #[test]
    fn test_validate_passes_for_one_to_one_placement() {
        let mut builder = RegionGraphBuilder::default();
        builder.add_location("Ledge", "Apple", false);
        builder.add_location("Menu", "Pear", false);
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_location_in_two_regions() {
        let mut builder = RegionGraphBuilder::default();
        builder.add_location("Ledge", "Apple", false);
        builder.add_location("Cliffs", "Apple", false);

        let err = builder.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Apple"));
        assert!(message.contains("Cliffs"));
        assert!(message.contains("Ledge"));
    }

    #[test]
    fn test_validate_rejects_unplaced_location_and_aggregates() {
        let mut builder = RegionGraphBuilder::default();
        builder.add_location("Ledge", "Apple", false);
        builder.add_location("Cliffs", "Apple", false);
        builder.add_location("Ledge", "Pear", false);
        builder.regions.get_mut("Ledge").unwrap().locations.remove("Pear");

        let err = builder.validate().unwrap_err();
        assert_eq!(err.problems().len(), 2);
        assert!(err.problems()[1].contains("Pear"));
    }

    #[test]
    fn test_validate_rejects_placed_location_without_node() {
        let mut builder = RegionGraphBuilder::default();
        builder
            .regions
            .get_mut("Menu")
            .unwrap()
            .locations
            .insert("Ghost".to_string());
        let err = builder.validate().unwrap_err();
        assert!(err.problems()[0].contains("Ghost"));
    }

    #[test]
    fn test_merge_scenario_apple_moves_to_menu() {
        let mut builder = RegionGraphBuilder::default();
        builder.declare(["Ledge", "Apple"]);
        let ledge = LogicObject::new("Ledge", ObjectKind::Default)
            .with_clause(clause(None, &["Sword"], &[]))
            .with_clause(clause(Some("Ledge"), &["Sword"], &[]));
        let apple = LogicObject::new("Apple", ObjectKind::Location)
            .with_clause(clause(Some("Ledge"), &[], &[]));
        builder.ingest(&ledge).unwrap();
        builder.ingest(&apple).unwrap();
        builder.validate().unwrap();

        let report = builder.clean(&CleanupOptions::default());

        assert_eq!(report.merged_regions, vec!["Apple", "Ledge"]);
        assert!(builder.region("Ledge").is_none());
        assert!(builder.region("Apple").is_none());
        let menu = builder.region("Menu").unwrap();
        assert!(menu.locations.contains("Apple"));
        assert!(menu.connections.is_empty());
        assert_eq!(builder.location("Apple").unwrap().branches, vec![items(&["Sword"])]);
        builder.validate().unwrap();
    }

    #[test]
    fn test_merge_multiplies_branches() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Ledge", items(&["A"]));
        builder.connect("Menu", "Ledge", items(&["B"]));
        builder.add_location("Ledge", "Apple", false);
        builder.locations.get_mut("Apple").unwrap().branches = vec![
            RequirementBranch::new().with_locations(["C"]),
            RequirementBranch::new().with_locations(["D"]).with_modifiers(["$TAKEDAMAGE"]),
        ];

        builder.clean(&CleanupOptions::default());

        let apple = builder.location("Apple").unwrap();
        assert_eq!(apple.branches.len(), 4);
        assert_eq!(
            apple.branches[0],
            RequirementBranch::new().with_items(["A"]).with_locations(["C"])
        );
        assert_eq!(
            apple.branches[3],
            RequirementBranch::new()
                .with_items(["B"])
                .with_locations(["D"])
                .with_modifiers(["$TAKEDAMAGE"])
        );
        assert!(builder.region("Menu").unwrap().locations.contains("Apple"));
    }

    #[test]
    fn test_region_with_two_parents_is_not_merged() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Cliffs", items(&["Claw"]));
        builder.connect("Menu", "Ledge", items(&["Sword"]));
        builder.connect("Cliffs", "Ledge", items(&["Dash"]));
        builder.add_location("Ledge", "Apple", false);
        builder.add_location("Cliffs", "Pear", false);

        builder.clean(&CleanupOptions::default());

        assert!(builder.region("Ledge").is_some());
        assert_eq!(builder.parents_of("Ledge").unwrap().len(), 2);
    }

    #[test]
    fn test_transitions_and_kept_regions_are_not_merged() {
        let mut builder = RegionGraphBuilder::default().with_keep_regions(["Shrine"]);
        builder
            .ingest(&LogicObject::new("Town[left1]", ObjectKind::Transition).with_clause(clause(
                None,
                &["Sword"],
                &[],
            )))
            .unwrap();
        builder.connect("Menu", "Shrine", items(&[]));

        let report = builder.clean(&CleanupOptions::default());

        assert!(report.merged_regions.is_empty());
        assert!(report.pruned_regions.is_empty());
        assert!(builder.region("Town[left1]").is_some());
        assert!(builder.region("Shrine").is_some());
    }

    #[test]
    fn test_merge_prunes_dominated_location_logic() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Ledge", items(&["Sword"]));
        builder.connect("Menu", "Ledge", items(&["Sword", "Lantern"]));
        builder.add_location("Ledge", "Apple", false);

        let report = builder.clean(&CleanupOptions::default());

        assert_eq!(report.removed_branches, 1);
        assert_eq!(builder.location("Apple").unwrap().branches, vec![items(&["Sword"])]);
    }

    #[test]
    fn test_strip_empty_branches_keeps_sole_entry() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Ledge", RequirementBranch::new());
        builder.connect("Menu", "Ledge", RequirementBranch::new().with_modifiers(["$BENCHRESET"]));
        builder.connect("Menu", "Cliffs", RequirementBranch::new());
        builder.connect("Ledge", "Cliffs", items(&["Claw"]));
        builder.add_location("Cliffs", "Apple", false);

        builder.strip_empty_branches();

        let menu = builder.region("Menu").unwrap();
        assert_eq!(
            menu.connection_to("Ledge").unwrap().branches,
            vec![RequirementBranch::new().with_modifiers(["$BENCHRESET"])]
        );
        assert_eq!(
            menu.connection_to("Cliffs").unwrap().branches,
            vec![RequirementBranch::new()]
        );
    }

    #[test]
    fn test_prune_dead_regions_cascades() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Hall", items(&["A"]));
        builder.connect("Cliffs", "Hall", items(&["B"]));
        builder.connect("Menu", "Cliffs", items(&["C"]));
        builder.add_location("Menu", "Pear", false);

        let pruned = builder.prune_dead_regions();

        assert_eq!(pruned, vec!["Hall", "Cliffs"]);
        assert!(builder.region("Menu").unwrap().connections.is_empty());
        assert!(builder.region("Cliffs").is_none());
        assert!(builder.parents_of("Hall").is_none());
    }

    #[test]
    fn test_pruning_can_be_disabled() {
        let mut builder = RegionGraphBuilder::default();
        builder.connect("Menu", "Hall", items(&["A"]));
        builder.connect("Cliffs", "Hall", items(&["B"]));
        builder.connect("Menu", "Cliffs", items(&["C"]));
        builder.connect("Cliffs", "Menu", items(&["D"]));

        let report = builder.clean(&CleanupOptions {
            strip_empty_branches: true,
            prune_dead_regions: false,
        });

        assert!(report.pruned_regions.is_empty());
        assert!(builder.region("Hall").is_some());
    }

    #[test]
    fn test_fixpoint_rounds_bounded_by_chain_length() {
        let mut builder = RegionGraphBuilder::default();
        let chain = ["R1", "R2", "R3", "R4", "R5"];
        let mut previous = "Menu";
        for name in chain {
            builder.connect(previous, name, items(&[name]));
            previous = name;
        }
        builder.add_location("R5", "Apple", false);

        let region_count = builder.regions().count();
        let report = builder.clean(&CleanupOptions::default());

        assert!(report.merge_rounds <= region_count);
        assert_eq!(report.merge_rounds, chain.len());
        assert_eq!(
            builder.location("Apple").unwrap().branches,
            vec![items(&["R1", "R2", "R3", "R4", "R5"])]
        );
    }

    #[test]
    fn test_custom_root() {
        let mut builder = RegionGraphBuilder::new("Start");
        builder
            .ingest(&LogicObject::new("Apple", ObjectKind::Location).with_clause(clause(
                None,
                &["Sword"],
                &[],
            )))
            .unwrap();
        builder.clean(&CleanupOptions::default());
        assert!(builder.region("Menu").is_none());
        assert!(builder.region("Start").unwrap().locations.contains("Apple"));
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_edges() -> impl Strategy<Value = Vec<(usize, usize, String)>> {
            prop::collection::vec((0usize..6, 0usize..6, "[A-C]"), 0..14)
        }

        fn build(edges: &[(usize, usize, String)]) -> RegionGraphBuilder {
            let mut builder = RegionGraphBuilder::default();
            let name = |i: usize| if i == 0 { "Menu".to_string() } else { format!("R{i}") };
            for (from, to, item) in edges {
                if from != to {
                    builder.connect(&name(*from), &name(*to), items(&[item.as_str()]));
                }
            }
            for i in 1..6 {
                if builder.region(&name(i)).is_some() {
                    builder.add_location(&name(i), &format!("L{i}"), false);
                }
            }
            builder
        }

        proptest! {
            // Property: merge rounds never exceed the starting region count
            #[test]
            fn prop_merge_rounds_bounded(edges in arb_edges()) {
                let mut builder = build(&edges);
                let region_count = builder.regions().count();
                let report = builder.clean(&CleanupOptions::default());
                prop_assert!(report.merge_rounds <= region_count);
            }

            // Property: cleanup keeps every location placed exactly once
            #[test]
            fn prop_cleanup_preserves_validity(edges in arb_edges()) {
                let mut builder = build(&edges);
                prop_assert!(builder.validate().is_ok());
                builder.clean(&CleanupOptions { strip_empty_branches: true, prune_dead_regions: false });
                prop_assert!(builder.validate().is_ok());
            }

            // Property: after cleanup no region is still eligible for merging
            #[test]
            fn prop_cleanup_reaches_fixpoint(edges in arb_edges()) {
                let mut builder = build(&edges);
                builder.clean(&CleanupOptions { strip_empty_branches: false, prune_dead_regions: false });
                prop_assert!(builder.merge_candidates().is_empty());
            }
        }
    }
}
