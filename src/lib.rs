//! regraph - compiles stateful DNF logic into a minimized region graph
//!
//! Every logic object becomes a region reached through alternative
//! requirement branches. Dominated branches are eliminated and single-parent
//! leaf regions are merged back into their parent until the graph stops
//! changing.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod input;
pub mod pipeline;
pub mod waypoint;

pub use config::Config;
pub use core::{
    classify_many, classify_single, cross_combine, dominates, eliminate_redundant,
    ModifierEffect, RequirementBranch, StatefulClause, Term,
};
pub use error::{RegraphError, Result};
pub use graph::{
    to_dot, CleanupOptions, CleanupReport, GraphWorld, LogicObject, ObjectKind,
    RegionGraphBuilder,
};
pub use input::InputDocument;
pub use pipeline::{compile, compile_objects, Compilation, CompileOptions};
pub use waypoint::{processing_order, ProcessingGroup, WaypointReferenceGraph};

// CLI commands
pub use cli::{BuildCommand, ClassifyCommand, CyclesCommand, InitCommand};
