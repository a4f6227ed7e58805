//! Classify command for regraph.
//!
//! Reports how state modifier tokens affect later reachability.

use serde::{Deserialize, Serialize};

use crate::core::{classify_many, classify_single, ModifierEffect};

/// Options for the classify command.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Classification of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedToken {
    pub token: String,
    pub effect: ModifierEffect,
}

/// Output format for the classify command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyOutput {
    /// Whether any token was given.
    pub success: bool,
    /// Per-token effects, in input order.
    pub tokens: Vec<ClassifiedToken>,
    /// Effect of applying every token in order.
    pub combined: ModifierEffect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The classify command implementation.
#[derive(Debug, Default)]
pub struct ClassifyCommand;

impl ClassifyCommand {
    /// Create a new classify command.
    pub fn new() -> Self {
        Self
    }

    /// Classify `tokens` individually and as a sequence.
    pub fn run(&self, tokens: &[String]) -> ClassifyOutput {
        if tokens.is_empty() {
            return ClassifyOutput {
                success: false,
                tokens: Vec::new(),
                combined: ModifierEffect::None,
                error: Some("no modifier tokens given".to_string()),
            };
        }

        ClassifyOutput {
            success: true,
            tokens: tokens
                .iter()
                .map(|token| ClassifiedToken {
                    token: token.clone(),
                    effect: classify_single(token),
                })
                .collect(),
            combined: classify_many(tokens),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ClassifyOutput, options: &ClassifyOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if let Some(error) = &output.error {
            return format!("Classify failed: {}\n", error);
        }

        let width = output
            .tokens
            .iter()
            .map(|t| t.token.len())
            .max()
            .unwrap_or(0);
        let mut lines: Vec<String> = output
            .tokens
            .iter()
            .map(|t| format!("{:width$}  {}", t.token, t.effect, width = width))
            .collect();
        if output.tokens.len() > 1 {
            lines.push(String::new());
            lines.push(format!("Combined: {}", output.combined));
        }
        lines.join("\n") + "\n"
    }
}
