//! Cycles command for regraph.
//!
//! Lists reference cycles between logic objects and the order in which the
//! objects can be processed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::input::InputDocument;
use crate::waypoint::{group_cycles, processing_order, ProcessingGroup, WaypointReferenceGraph};

/// Options for the cycles command.
#[derive(Debug, Clone, Default)]
pub struct CyclesOptions {
    /// Input document path.
    pub input: PathBuf,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the cycles command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CyclesOutput {
    pub success: bool,
    /// Number of objects in the document.
    pub objects: usize,
    /// Every cyclic reference path, ending with the repeated name.
    pub cycles: Vec<Vec<String>>,
    /// Distinct groups of names that form a cycle.
    pub groups: Vec<Vec<String>>,
    /// Dependency-first processing order.
    pub order: Vec<ProcessingGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The cycles command implementation.
pub struct CyclesCommand {
    config: Config,
}

impl CyclesCommand {
    /// Create a new cycles command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the cycles command.
    pub fn run(&self, options: &CyclesOptions) -> CyclesOutput {
        self.analyze(options).unwrap_or_else(|e| CyclesOutput {
            success: false,
            error: Some(e.to_string()),
            ..Default::default()
        })
    }

    fn analyze(&self, options: &CyclesOptions) -> Result<CyclesOutput> {
        let document =
            InputDocument::load(&options.input, self.config.input.max_file_size_bytes())?;
        let objects = document.to_logic_objects()?;
        let graph = WaypointReferenceGraph::from_objects(&objects);
        let cycles = graph.find_cycles();

        Ok(CyclesOutput {
            success: true,
            objects: objects.len(),
            groups: group_cycles(&cycles)
                .into_iter()
                .map(|g| g.into_iter().collect())
                .collect(),
            cycles: cycles.into_iter().map(|p| p.names).collect(),
            order: processing_order(&graph),
            error: None,
        })
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CyclesOutput, options: &CyclesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if let Some(error) = &output.error {
            return format!("Cycle check failed: {}\n", error);
        }

        if output.cycles.is_empty() {
            return format!("No reference cycles among {} objects.\n", output.objects);
        }

        let mut lines = vec![format!(
            "Found {} cycle groups among {} objects:",
            output.groups.len(),
            output.objects
        )];
        for group in &output.groups {
            lines.push(format!("  {{{}}}", group.join(", ")));
        }
        lines.push(String::new());
        lines.push("Cyclic paths:".to_string());
        for path in &output.cycles {
            lines.push(format!("  {}", path.join(" -> ")));
        }
        lines.join("\n") + "\n"
    }
}
