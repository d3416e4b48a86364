//! The `tasks` command: print the discovered installer capability table.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::project::Manifest;
use crate::task::discover_tasks;

/// Arguments for `ingot tasks`.
#[derive(Debug, Clone, Args)]
pub struct TasksCommand {}

impl TasksCommand {
    /// Discover and list installer tasks for the current project.
    ///
    /// # Errors
    ///
    /// Fails when no manifest is found or the tasks directory is unreadable.
    pub fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let manifest = match manifest_path {
            Some(path) => Manifest::load(&path)?,
            None => Manifest::find(&std::env::current_dir()?)?,
        };

        let table = discover_tasks(manifest.root())?;
        if table.is_empty() {
            println!("No installer tasks discovered.");
            return Ok(());
        }

        println!("{}", "Discovered installer tasks:".bold());
        for handle in table.iter() {
            println!("  {} -> {}", handle.name, handle.command.display());
        }
        Ok(())
    }
}
