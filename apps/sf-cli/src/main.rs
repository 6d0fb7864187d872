//! # sf-cli
//!
//! Command-line interface for SafeFrame.
//!
//! - `sf evaluate <text>` — parse an instruction, decide, audit and publish
//! - `sf action --description <text>` — decide for a proposed action
//! - `sf matrix <probability> <impact>` — risk-matrix lookup
//! - `sf values` / `sf constraints` — list the configured catalogs
//! - `sf audit verify/tail` — inspect the decision audit log

mod commands;
mod project;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use project::ProjectConfig;

/// SafeFrame: decide whether an agent action may proceed.
#[derive(Parser)]
#[command(name = "sf", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Policy config file (defaults to <project-root>/.sf/policy.yaml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an instruction into an intent and decide on it.
    Evaluate(commands::evaluate::EvaluateArgs),
    /// Decide on a proposed action.
    Action(commands::action::ActionArgs),
    /// Look up a probability/impact pair in the risk matrix.
    Matrix(commands::matrix::MatrixArgs),
    /// List the configured value catalog.
    Values,
    /// List the configured hard and soft constraints.
    Constraints,
    /// Inspect the decision audit log.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // SF_LOG takes precedence over RUST_LOG. Logs go to stderr so JSON
    // output on stdout stays machine-readable.
    let filter =
        EnvFilter::try_from_env("SF_LOG").unwrap_or_else(|_| EnvFilter::from_default_env());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = ProjectConfig::for_project(&project_root, cli.config.as_deref());

    match &cli.command {
        Commands::Evaluate(args) => commands::evaluate::execute(args, &config),
        Commands::Action(args) => commands::action::execute(args, &config),
        Commands::Matrix(args) => commands::matrix::execute(args),
        Commands::Values => commands::catalog::values(&config),
        Commands::Constraints => commands::catalog::constraints(&config),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}
