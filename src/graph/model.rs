//! Node types owned by the region graph builder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::{RequirementBranch, StatefulClause};

/// How the builder treats a logic object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A waypoint: becomes a region, nothing more.
    #[default]
    Default,
    /// A physical location (or event) placed in its own region.
    Location,
    /// A transition: its region is never merged away.
    Transition,
}

/// A named logic object with its DNF clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicObject {
    /// Unique object name.
    pub name: String,
    /// How the object is ingested.
    pub kind: ObjectKind,
    /// Whether a location object represents an in-game event.
    pub event: bool,
    /// Alternatives for reaching the object.
    pub clauses: Vec<StatefulClause>,
}

impl LogicObject {
    /// Create an object with no clauses.
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            event: false,
            clauses: Vec::new(),
        }
    }

    /// Add a clause.
    pub fn with_clause(mut self, clause: StatefulClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Mark a location object as an event.
    pub fn as_event(mut self) -> Self {
        self.event = true;
        self
    }
}

/// A directed edge to another region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Target region name.
    pub target: String,
    /// Alternative ways to traverse the edge.
    pub branches: Vec<RequirementBranch>,
}

/// A traversable region of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    /// Unique region name.
    pub name: String,
    /// Locations placed in this region.
    pub locations: BTreeSet<String>,
    /// Outgoing connections in insertion order.
    pub connections: Vec<Connection>,
}

impl Region {
    /// Create an empty region.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The connection to `target`, if any.
    pub fn connection_to(&self, target: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.target == target)
    }

    pub(crate) fn connection_to_mut(&mut self, target: &str) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.target == target)
    }

    pub(crate) fn remove_connection(&mut self, target: &str) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.target == target)?;
        Some(self.connections.remove(idx))
    }

    /// True when the region has no locations and no exits.
    pub fn is_dead_end(&self) -> bool {
        self.locations.is_empty() && self.connections.is_empty()
    }
}

/// A location node with the logic needed once its region is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphLocation {
    /// Location name.
    pub name: String,
    /// Alternative ways to obtain the location from inside its region.
    pub branches: Vec<RequirementBranch>,
    /// Whether this is an in-game event rather than a physical location.
    pub event: bool,
}

impl GraphLocation {
    /// Create a location with a single always-satisfied branch.
    pub fn new(name: impl Into<String>, event: bool) -> Self {
        Self {
            name: name.into(),
            branches: vec![RequirementBranch::new()],
            event,
        }
    }
}
