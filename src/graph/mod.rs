//! Region graph construction, simplification and export.

pub mod builder;
pub mod export;
pub mod model;

pub use builder::{CleanupOptions, CleanupReport, RegionGraphBuilder, DEFAULT_ROOT};
pub use export::{to_dot, ExitDefinition, GraphWorld, LocationDefinition, RegionDefinition};
pub use model::{Connection, GraphLocation, LogicObject, ObjectKind, Region};
