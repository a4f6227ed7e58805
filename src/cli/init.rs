//! Init command for regraph.
//!
//! Pins the effective configuration into the project's
//! `.regraph/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Overwrite an existing config file.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Files and directories created.
    pub created: Vec<String>,
    /// Files that already existed (skipped).
    pub skipped: Vec<String>,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
        }
    }

    /// Create a failed output, keeping what was created before the failure.
    pub fn failure(error: impl Into<String>, created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: false,
            created,
            skipped,
            error: Some(error.into()),
        }
    }
}

/// The init command implementation.
pub struct InitCommand {
    cwd: PathBuf,
    config: Config,
}

impl InitCommand {
    /// Create a new init command writing `config`.
    pub fn new(cwd: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            cwd: cwd.into(),
            config,
        }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let mut created = Vec::new();
        let mut skipped = Vec::new();

        let regraph_dir = self.cwd.join(".regraph");
        let config_path = regraph_dir.join("config.toml");

        if regraph_dir.exists() && !regraph_dir.is_dir() {
            return InitOutput::failure(
                format!("{} exists but is not a directory", regraph_dir.display()),
                created,
                skipped,
            );
        }
        if !regraph_dir.exists() {
            created.push(regraph_dir.display().to_string());
        }

        if config_path.exists() && !options.force {
            skipped.push(config_path.display().to_string());
            return InitOutput::success(created, skipped);
        }

        match self.config.save_project(&self.cwd) {
            Ok(path) => created.push(path.display().to_string()),
            Err(e) => return InitOutput::failure(e.to_string(), created, skipped),
        }

        InitOutput::success(created, skipped)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &InitOutput) -> String {
        let mut lines = Vec::new();

        if !output.success {
            lines.push(format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            ));
            if !output.created.is_empty() {
                lines.push("Partially created before failure:".to_string());
                lines.extend(output.created.iter().map(|p| format!("  {}", p)));
            }
            return lines.join("\n") + "\n";
        }

        if output.created.is_empty() {
            lines.push("regraph already initialized.".to_string());
            lines.extend(output.skipped.iter().map(|p| format!("  {}", p)));
            lines.push("Use --force to overwrite.".to_string());
            return lines.join("\n") + "\n";
        }

        lines.push("Created:".to_string());
        lines.extend(output.created.iter().map(|p| format!("  {}", p)));
        lines.push(String::new());
        lines.push("regraph initialized successfully.".to_string());

        lines.join("\n") + "\n"
    }
}
