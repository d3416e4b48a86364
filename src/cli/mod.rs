//! Command-line interface for ingot.
//!
//! The CLI follows standard conventions: global options (`--verbose`,
//! `--quiet`, `--manifest-path`) apply to every subcommand, and each
//! subcommand owns its arguments in its own module:
//!
//! - [`install`] — resolve specifiers, add and fetch packages, run their
//!   installer tasks (the core command)
//! - [`init`] — write a starter `ingot.toml`
//! - [`tasks`] — print the discovered installer capability table
//!
//! Verbosity maps onto the `tracing` subscriber: `--verbose` enables debug
//! logs, `--quiet` restricts output to errors, and `RUST_LOG` overrides
//! both when set.

pub mod init;
pub mod install;
pub mod tasks;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Top-level CLI for ingot.
#[derive(Parser)]
#[command(
    name = "ingot",
    about = "Project-aware package installer",
    version,
    long_about = "Ingot resolves package specifiers, adds the packages to your project, \
                  fetches them, and runs each package's installer task."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug-level logs).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the manifest file (ingot.toml).
    ///
    /// By default ingot searches the current directory and its parents.
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Install packages and run their installer tasks.
    Install(install::InstallCommand),

    /// Create a starter ingot.toml in the current directory.
    Init(init::InitCommand),

    /// List the installer tasks discovered for this project.
    Tasks(tasks::TasksCommand),
}

impl Cli {
    /// Initialize logging and dispatch to the selected subcommand.
    ///
    /// # Errors
    ///
    /// Propagates the subcommand's failure for the binary to render.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        match self.command {
            Commands::Install(cmd) => cmd.execute(self.manifest_path).await,
            Commands::Init(cmd) => cmd.execute(self.manifest_path),
            Commands::Tasks(cmd) => cmd.execute(self.manifest_path),
        }
    }
}

/// Set up the tracing subscriber from the verbosity flags.
///
/// `RUST_LOG` takes precedence when present. Initialization is best-effort
/// so repeated calls (tests) do not panic.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
