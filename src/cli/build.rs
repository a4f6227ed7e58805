//! Build command for regraph.
//!
//! Compiles a logic document into a graph world and writes it as JSON, with
//! an optional Graphviz rendering.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{RegraphError, Result};
use crate::graph::{to_dot, GraphWorld};
use crate::input::InputDocument;
use crate::pipeline::{compile, CompileOptions};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Input document path.
    pub input: PathBuf,
    /// Where to write the world JSON. Printed to stdout when absent.
    pub output: Option<PathBuf>,
    /// Where to write the DOT rendering.
    pub dot: Option<PathBuf>,
    /// Root region name, overriding the document and config.
    pub start: Option<String>,
    /// Extra regions to keep.
    pub keep: Vec<String>,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the build command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOutput {
    /// Whether the build succeeded.
    pub success: bool,
    pub start_region: String,
    pub regions: usize,
    pub locations: usize,
    pub exits: usize,
    pub merge_rounds: usize,
    pub merged_regions: usize,
    pub removed_branches: usize,
    pub pruned_regions: Vec<String>,
    /// Groups of objects whose logic refers to each other.
    pub cycle_groups: Vec<Vec<String>>,
    /// Files written.
    pub written: Vec<String>,
    /// The world itself when no output file was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world: Option<GraphWorld>,
    /// Individual validation problems.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildOutput {
    /// Create a failed output.
    pub fn failure(error: &RegraphError) -> Self {
        Self {
            success: false,
            problems: error.problems().to_vec(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

/// The build command implementation.
pub struct BuildCommand {
    config: Config,
}

impl BuildCommand {
    /// Create a new build command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the build command.
    pub fn run(&self, options: &BuildOptions) -> BuildOutput {
        match self.build(options) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "build failed");
                BuildOutput::failure(&e)
            }
        }
    }

    fn build(&self, options: &BuildOptions) -> Result<BuildOutput> {
        let mut document =
            InputDocument::load(&options.input, self.config.input.max_file_size_bytes())?;
        if let Some(start) = &options.start {
            document.start = Some(start.clone());
        }

        let mut compile_options = CompileOptions::from_config(&self.config);
        compile_options.keep_regions.extend(options.keep.iter().cloned());

        let compilation = compile(&document, &compile_options)?;
        let world = compilation.world;
        let report = compilation.report;

        let mut written = Vec::new();
        if let Some(path) = &options.output {
            write_file(path, &self.render_json(&world)?)?;
            written.push(path.display().to_string());
        }
        if let Some(path) = self.dot_path(options) {
            write_file(&path, &to_dot(&world))?;
            written.push(path.display().to_string());
        }

        Ok(BuildOutput {
            success: true,
            start_region: world.start_region.clone(),
            regions: world.regions.len(),
            locations: world.locations.len(),
            exits: world.exit_count(),
            merge_rounds: report.merge_rounds,
            merged_regions: report.merged_regions.len(),
            removed_branches: report.removed_branches,
            pruned_regions: report.pruned_regions,
            cycle_groups: compilation
                .cycle_groups
                .into_iter()
                .map(|g| g.into_iter().collect())
                .collect(),
            written,
            world: options.output.is_none().then_some(world),
            problems: Vec::new(),
            error: None,
        })
    }

    /// `--dot` wins; otherwise `output.dot` places it next to the JSON.
    fn dot_path(&self, options: &BuildOptions) -> Option<PathBuf> {
        if let Some(path) = &options.dot {
            return Some(path.clone());
        }
        if self.config.output.dot {
            return options.output.as_ref().map(|p| p.with_extension("dot"));
        }
        None
    }

    fn render_json(&self, world: &GraphWorld) -> Result<String> {
        let text = if self.config.output.pretty {
            serde_json::to_string_pretty(world)?
        } else {
            serde_json::to_string(world)?
        };
        Ok(text + "\n")
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BuildOutput, options: &BuildOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            let mut lines = vec![format!(
                "Build failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            )];
            lines.extend(output.problems.iter().map(|p| format!("  - {}", p)));
            return lines.join("\n") + "\n";
        }

        // Without an output file the world itself is the result.
        if let Some(world) = &output.world {
            return self
                .render_json(world)
                .unwrap_or_else(|e| format!("Build failed: {}\n", e));
        }

        let mut lines = vec![
            format!(
                "Built {} regions, {} locations, {} exits (start: {})",
                output.regions, output.locations, output.exits, output.start_region
            ),
            format!(
                "Merged {} regions in {} rounds, removed {} dominated branches",
                output.merged_regions, output.merge_rounds, output.removed_branches
            ),
        ];
        if !output.pruned_regions.is_empty() {
            lines.push(format!(
                "Pruned dead ends: {}",
                output.pruned_regions.join(", ")
            ));
        }
        for group in &output.cycle_groups {
            lines.push(format!("Reference cycle: {}", group.join(" -> ")));
        }
        for path in &output.written {
            lines.push(format!("Wrote {}", path));
        }
        lines.join("\n") + "\n"
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RegraphError::storage(parent, e))?;
    }
    fs::write(path, content).map_err(|e| RegraphError::storage(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LOGIC: &str = r#"{"objects": [
        {"name": "Ledge", "clauses": [{"conditions": ["Sword"]}]},
        {"name": "Apple", "kind": "location", "clauses": [{"provider": "Ledge"}]},
        {"name": "Town[left1]", "kind": "transition", "clauses": [{"conditions": ["Claw"]}]}
    ]}"#;

    fn setup(logic: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("logic.json");
        fs::write(&input, logic).unwrap();
        (temp, input)
    }

    #[test]
    fn test_build_to_stdout() {
        let (_temp, input) = setup(LOGIC);
        let cmd = BuildCommand::new(Config::default());
        let options = BuildOptions {
            input,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert_eq!(output.start_region, "Menu");
        assert_eq!(output.regions, 2);
        assert_eq!(output.merged_regions, 2);
        assert!(output.written.is_empty());

        let formatted = cmd.format_output(&output, &options);
        let world: GraphWorld = serde_json::from_str(&formatted).unwrap();
        assert_eq!(world.location("Apple").unwrap().logic.len(), 1);
    }

    #[test]
    fn test_build_writes_files() {
        let (temp, input) = setup(LOGIC);
        let out = temp.path().join("out").join("world.json");
        let dot = temp.path().join("world.dot");
        let cmd = BuildCommand::new(Config::default());
        let options = BuildOptions {
            input,
            output: Some(out.clone()),
            dot: Some(dot.clone()),
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        assert!(output.world.is_none());
        assert_eq!(output.written.len(), 2);

        let world: GraphWorld = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(world.transitions, vec!["Town[left1]"]);
        assert!(fs::read_to_string(&dot).unwrap().starts_with("digraph world {"));

        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("Built 2 regions"));
        assert!(formatted.contains("Wrote"));
    }

    #[test]
    fn test_config_dot_next_to_output() {
        let (temp, input) = setup(LOGIC);
        let mut config = Config::default();
        config.output.dot = true;
        config.output.pretty = false;
        let out = temp.path().join("world.json");

        let output = BuildCommand::new(config).run(&BuildOptions {
            input,
            output: Some(out.clone()),
            ..Default::default()
        });

        assert!(output.success);
        assert!(temp.path().join("world.dot").exists());
        assert!(!fs::read_to_string(&out).unwrap().contains("\n  "));
    }

    #[test]
    fn test_start_and_keep_flags() {
        let (_temp, input) = setup(LOGIC);
        let output = BuildCommand::new(Config::default()).run(&BuildOptions {
            input,
            start: Some("Title".to_string()),
            keep: vec!["Ledge".to_string()],
            ..Default::default()
        });

        assert!(output.success);
        let world = output.world.unwrap();
        assert_eq!(world.start_region, "Title");
        assert!(world.region("Ledge").unwrap().locations.contains(&"Apple".to_string()));
    }

    #[test]
    fn test_malformed_term_fails_build() {
        let (_temp, input) = setup(
            r#"{"objects": [
                {"name": "Apple", "kind": "location", "clauses": [{"conditions": ["A?B"]}]}
            ]}"#,
        );
        let cmd = BuildCommand::new(Config::default());
        let options = BuildOptions {
            input,
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(!output.success);
        assert!(output.error.as_deref().unwrap().contains("malformed term"));

        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.starts_with("Build failed:"));
    }

    #[test]
    fn test_failure_output_carries_problems() {
        let err = RegraphError::validation(vec!["one".to_string(), "two".to_string()]);
        let output = BuildOutput::failure(&err);
        let cmd = BuildCommand::new(Config::default());

        let formatted = cmd.format_output(&output, &BuildOptions::default());
        assert!(formatted.contains("  - one"));
        assert!(formatted.contains("  - two"));

        let json = cmd.format_output(
            &output,
            &BuildOptions {
                json: true,
                ..Default::default()
            },
        );
        assert!(json.contains("\"problems\""));
        assert!(json.contains("\"success\": false"));
    }

    #[test]
    fn test_missing_input() {
        let temp = TempDir::new().unwrap();
        let output = BuildCommand::new(Config::default()).run(&BuildOptions {
            input: temp.path().join("missing.json"),
            ..Default::default()
        });
        assert!(!output.success);
        assert!(output.error.unwrap().contains("missing.json"));
    }

    #[test]
    fn test_format_quiet() {
        let cmd = BuildCommand::new(Config::default());
        let options = BuildOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd
            .format_output(&BuildOutput::default(), &options)
            .is_empty());
    }
}
