//! file-sync: copy a list of files from one repository into another and
//! open a pull request when anything changed.
//!
//! # Usage
//!
//! ```text
//! file-sync run [--dry-run] [--json] [--verbose] [--use-default-files]
//! file-sync diff [--verbose] [--use-default-files]
//! file-sync files [--use-default-files]
//! ```
//!
//! All inputs come from the environment (`INPUT_*` and `GITHUB_*`).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, files::FilesArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "file-sync",
    version,
    about = "Synchronize files between repositories through a pull request",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone, copy, and commit, push and open a pull request if anything changed.
    Run(RunArgs),

    /// Show a unified diff of what a run would change.
    Diff(DiffArgs),

    /// Print the resolved file list.
    Files(FilesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Files(args) => args.run(),
    }
}
