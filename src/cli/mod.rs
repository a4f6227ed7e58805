//! CLI commands for regraph.
//!
//! - **build**: compile a logic document into a graph world
//! - **cycles**: report reference cycles and processing order
//! - **classify**: show modifier token effects
//! - **init**: write the project config

pub mod build;
pub mod classify;
pub mod cycles;
pub mod init;

pub use build::BuildCommand;
pub use classify::ClassifyCommand;
pub use cycles::CyclesCommand;
pub use init::InitCommand;
