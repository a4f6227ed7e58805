//! Reference analysis between logic objects.

pub mod order;
pub mod references;

pub use order::{processing_order, ProcessingGroup};
pub use references::{
    group_cycles, largest_cycle_group, ReferenceNode, ReferencePath, WaypointReferenceGraph,
};
