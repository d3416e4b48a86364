//! The `install` command: the end-to-end dependency install pipeline.
//!
//! ```bash
//! # Registry packages, latest release resolved for bare names
//! ingot install ash ash_postgres@~2.0
//!
//! # Source directives
//! ingot install foo@git:https://example.com/foo.git@main
//! ingot install foo@github:org/foo@v1 bar@path:../bar
//!
//! # Scope to environments, auto-confirm, preview only
//! ingot install ash --only dev,test --yes
//! ingot install ash --dry-run
//!
//! # Forward arguments to every installer task
//! ingot install ash -- --example
//! ```
//!
//! The run environment is taken from `INGOT_ENV` (default `dev`) here at
//! the CLI boundary and passed down explicitly; nothing deeper reads
//! ambient process state.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::installer::{ConsoleExecutor, InstallRequest, Orchestrator};
use crate::project::{Manifest, ManifestFetcher, WorkingContext};
use crate::registry::RegistryClient;
use crate::requirement::{InstallInput, normalize};
use crate::task::{Environment, discover_tasks};

/// Arguments for `ingot install`.
#[derive(Debug, Clone, Args)]
pub struct InstallCommand {
    /// Package specifiers to install.
    ///
    /// Formats:
    ///   name                     latest release from the registry
    ///   name@1.2.3               exact version
    ///   name@~1.2                version requirement
    ///   name@git:url[@ref]       git source
    ///   name@github:org/proj[@ref]  github source
    ///   name@path:../local       local path source
    #[arg(value_name = "SPECIFIER", required = true, num_args = 1..)]
    specifiers: Vec<String>,

    /// Only run when the current environment is one of these
    /// (comma-separated, e.g. `--only dev,test`).
    #[arg(long, value_name = "ENV", value_delimiter = ',')]
    only: Option<Vec<String>>,

    /// Apply without prompting for confirmation.
    #[arg(long, short = 'y')]
    yes: bool,

    /// Preview the composed installer operations without applying them.
    #[arg(long)]
    dry_run: bool,

    /// Keep existing manifest entries instead of overwriting them.
    #[arg(long)]
    append: bool,

    /// Arguments after `--` forwarded to every installer task, untouched.
    #[arg(last = true, value_name = "ARGS")]
    installer_args: Vec<String>,
}

impl InstallCommand {
    /// Run the install pipeline.
    ///
    /// # Errors
    ///
    /// Any fatal pipeline error: invalid specifier, self-install, registry
    /// resolution failure, missing manifest, environment mismatch, or
    /// dependency fetch failure.
    pub async fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let current_env =
            Environment::from_option(std::env::var("INGOT_ENV").ok().as_deref());

        let registry = RegistryClient::new()?;
        let descriptors =
            normalize(InstallInput::List(self.specifiers.clone()), &registry).await?;

        let manifest = match manifest_path {
            Some(path) => Manifest::load(&path)?,
            None => Manifest::find(&std::env::current_dir()?)?,
        };
        let table = discover_tasks(manifest.root())?;
        let ctx = WorkingContext::new(manifest);

        let request = InstallRequest {
            argv: self.installer_args.clone(),
            only: self.only.as_ref().map(|envs| {
                envs.iter()
                    .map(|env| Environment::from_option(Some(env.as_str())))
                    .collect()
            }),
            yes: self.yes,
            append: self.append,
            dry_run: self.dry_run,
        };

        let fetcher = ManifestFetcher::new();
        let executor = ConsoleExecutor::new();
        let orchestrator = Orchestrator::new(&fetcher, &table, &executor);

        let report = orchestrator.install(&descriptors, &request, &current_env, ctx)?;

        let noun = if descriptors.len() == 1 { "package" } else { "packages" };
        println!(
            "{} {} {noun} added to the manifest",
            "✓".green(),
            descriptors.len()
        );
        if report.available.is_empty() && report.unavailable.is_empty() {
            println!("Nothing to install.");
        }

        Ok(())
    }

    /// Pass-through installer arguments (exposed for CLI parse tests).
    #[must_use]
    pub fn installer_args(&self) -> &[String] {
        &self.installer_args
    }
}
