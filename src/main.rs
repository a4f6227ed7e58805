//! regraph - stateful logic to region graph compiler
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use regraph::config::{crash_log_path, Config};
use regraph::error::exit_codes;

// =============================================================================
// CLI Definition
// =============================================================================

/// regraph - compile stateful DNF logic into a minimized region graph
#[derive(Parser)]
#[command(name = "regraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a logic document into a graph world
    Build {
        /// Logic document (JSON)
        input: PathBuf,
        /// Write the world JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write a Graphviz rendering here
        #[arg(long)]
        dot: Option<PathBuf>,
        /// Root region name
        #[arg(long)]
        start: Option<String>,
        /// Region to keep through cleanup (repeatable)
        #[arg(long = "keep", value_name = "NAME")]
        keep: Vec<String>,
        /// Output a JSON summary
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Report reference cycles between logic objects
    Cycles {
        /// Logic document (JSON)
        input: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Classify state modifier tokens
    Classify {
        /// Modifier tokens, in application order
        #[arg(required = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Write the effective configuration to .regraph/config.toml
    Init {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Overwrite an existing config file
        #[arg(long, short)]
        force: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("regraph error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr, filtered by `REGRAPH_LOG` (default `warn`).
fn setup_logging() {
    let filter =
        EnvFilter::try_from_env("REGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Set up the global panic handler.
///
/// On panic, logs to `<regraph_home>/crash.log` and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("regraph panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Build {
            input,
            output,
            dot,
            start,
            keep,
            json,
            quiet,
        } => {
            let options = regraph::cli::build::BuildOptions {
                input,
                output,
                dot,
                start,
                keep,
                json,
                quiet,
            };
            run_build(options, &cwd)
        }
        Commands::Cycles { input, json, quiet } => run_cycles(input, json, quiet, &cwd),
        Commands::Classify {
            tokens,
            json,
            quiet,
        } => run_classify(&tokens, json, quiet),
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
}

fn run_build(
    options: regraph::cli::build::BuildOptions,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use regraph::cli::build::BuildCommand;

    let cmd = BuildCommand::new(Config::load_from_cwd(cwd));
    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_cycles(
    input: PathBuf,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use regraph::cli::cycles::{CyclesCommand, CyclesOptions};

    let cmd = CyclesCommand::new(Config::load_from_cwd(cwd));
    let options = CyclesOptions { input, json, quiet };
    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_classify(
    tokens: &[String],
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use regraph::cli::classify::{ClassifyCommand, ClassifyOptions};

    let cmd = ClassifyCommand::new();
    let options = ClassifyOptions { json, quiet };
    let output = cmd.run(tokens);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use regraph::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(cwd, Config::load_from_cwd(cwd));
    let options = InitOptions { json, quiet, force };
    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
