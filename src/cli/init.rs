//! The `init` command: write a starter manifest.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::constants::MANIFEST_FILE;
use crate::project::Manifest;

/// Arguments for `ingot init`.
#[derive(Debug, Clone, Args)]
pub struct InitCommand {
    /// Directory to initialize (defaults to the current directory).
    #[arg(value_name = "DIR")]
    directory: Option<PathBuf>,
}

impl InitCommand {
    /// Write a starter `ingot.toml`, refusing to overwrite an existing one.
    ///
    /// # Errors
    ///
    /// Fails when the manifest already exists or the write fails.
    pub fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let target = match manifest_path {
            Some(path) => path,
            None => self
                .directory
                .unwrap_or(std::env::current_dir()?)
                .join(MANIFEST_FILE),
        };

        Manifest::write_starter(&target)?;
        println!("{} created {}", "✓".green(), target.display());
        Ok(())
    }
}
