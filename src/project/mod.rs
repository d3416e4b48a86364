//! Project manifest handling and the production fetch collaborator.
//!
//! A project is a directory with an `ingot.toml` manifest:
//!
//! ```toml
//! [package]
//! name = "my_app"
//!
//! [dependencies]
//! ash = "^2.3"
//! foo = { git = "https://example.com/foo.git", ref = "main" }
//!
//! [tool]
//! fetch-command = ["mix", "deps.get"]
//! ```
//!
//! Edits go through [`toml_edit`] so user formatting and comments survive a
//! dependency addition. The `[tool] fetch-command` is the external
//! dependency-management hook: after the manifest is updated, ingot runs it
//! from the project root and treats a non-zero exit as
//! [`IngotError::DependencyFetchFailed`]. There is no rollback of the
//! manifest on fetch failure; the error message reports the partial state.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use toml_edit::{DocumentMut, InlineTable, Item, Table, value};
use tracing::{debug, info};

use crate::constants::MANIFEST_FILE;
use crate::core::IngotError;
use crate::installer::{DependencyFetcher, RunOptions};
use crate::specifier::{DependencyDescriptor, DependencySource};
use crate::task::ComposedTask;

/// Starter manifest written by `ingot init`.
pub const STARTER_MANIFEST: &str = r#"# ingot project manifest
[package]
name = "my_app"

[dependencies]

[tool]
# Command run from the project root after dependencies change:
# fetch-command = ["mix", "deps.get"]
"#;

/// Typed view of the manifest sections ingot reads (as opposed to edits).
#[derive(Debug, Deserialize, Default)]
struct ManifestConfig {
    #[serde(default)]
    tool: ToolConfig,
}

/// The `[tool]` section.
#[derive(Debug, Deserialize, Default)]
struct ToolConfig {
    #[serde(rename = "fetch-command")]
    fetch_command: Option<Vec<String>>,
}

/// The project manifest, held as a format-preserving TOML document.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: DocumentMut,
}

impl Manifest {
    /// Load a manifest from an exact path.
    ///
    /// # Errors
    ///
    /// [`IngotError::ManifestNotFound`] when the file does not exist,
    /// [`IngotError::ManifestParseError`] on invalid TOML.
    pub fn load(path: &Path) -> Result<Self, IngotError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                IngotError::ManifestNotFound
            } else {
                err.into()
            }
        })?;

        let document: DocumentMut =
            content
                .parse()
                .map_err(|err: toml_edit::TomlError| IngotError::ManifestParseError {
                    file: path.display().to_string(),
                    reason: err.to_string(),
                })?;

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Walk up from `start` looking for an `ingot.toml`, then load it.
    ///
    /// # Errors
    ///
    /// [`IngotError::ManifestNotFound`] when no ancestor contains one.
    pub fn find(start: &Path) -> Result<Self, IngotError> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(MANIFEST_FILE);
            if candidate.is_file() {
                debug!(manifest = %candidate.display(), "manifest found");
                return Self::load(&candidate);
            }
            dir = current.parent();
        }
        Err(IngotError::ManifestNotFound)
    }

    /// Write a starter manifest, refusing to overwrite an existing one.
    ///
    /// # Errors
    ///
    /// [`IngotError::ManifestAlreadyExists`] when the path already exists,
    /// otherwise filesystem errors from the write.
    pub fn write_starter(path: &Path) -> Result<(), IngotError> {
        if path.exists() {
            return Err(IngotError::ManifestAlreadyExists {
                path: path.display().to_string(),
            });
        }
        std::fs::write(path, STARTER_MANIFEST)?;
        Ok(())
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project root: the directory containing the manifest.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Record a dependency in `[dependencies]`.
    ///
    /// An existing entry for the same package is overwritten with the new
    /// requirement unless `append` is set, in which case the existing entry
    /// wins and `false` is returned.
    ///
    /// # Errors
    ///
    /// [`IngotError::ManifestParseError`] when `[dependencies]` exists but
    /// is not a table.
    pub fn add_dependency(
        &mut self,
        descriptor: &DependencyDescriptor,
        append: bool,
    ) -> Result<bool, IngotError> {
        let item = self
            .document
            .entry("dependencies")
            .or_insert(Item::Table(Table::new()));
        let table = item.as_table_mut().ok_or_else(|| IngotError::ManifestParseError {
            file: self.path.display().to_string(),
            reason: "`dependencies` is not a table".to_string(),
        })?;

        if append && table.contains_key(&descriptor.name) {
            debug!(package = %descriptor.name, "entry exists, keeping it (--append)");
            return Ok(false);
        }

        table.insert(&descriptor.name, dependency_item(&descriptor.source));
        Ok(true)
    }

    /// Persist the document back to disk.
    ///
    /// # Errors
    ///
    /// Filesystem errors from the write.
    pub fn save(&self) -> Result<(), IngotError> {
        std::fs::write(&self.path, self.document.to_string())?;
        Ok(())
    }

    /// The configured `[tool] fetch-command`, if any.
    ///
    /// # Errors
    ///
    /// [`IngotError::ManifestParseError`] when the section fails typed
    /// deserialization.
    pub fn fetch_command(&self) -> Result<Option<Vec<String>>, IngotError> {
        let config: ManifestConfig = toml::from_str(&self.document.to_string()).map_err(|err| {
            IngotError::ManifestParseError {
                file: self.path.display().to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(config.tool.fetch_command)
    }
}

/// Render a dependency source as its manifest value.
fn dependency_item(source: &DependencySource) -> Item {
    match source {
        DependencySource::Registry { constraint } => value(constraint.to_string()),
        DependencySource::Git { url, reference, .. } => {
            let mut entry = InlineTable::new();
            entry.insert("git", url.clone().into());
            if let Some(reference) = reference {
                entry.insert("ref", reference.clone().into());
            }
            value(entry)
        }
        DependencySource::GitHub {
            org,
            project,
            reference,
            ..
        } => {
            let mut entry = InlineTable::new();
            entry.insert("github", format!("{org}/{project}").into());
            if let Some(reference) = reference {
                entry.insert("ref", reference.clone().into());
            }
            value(entry)
        }
        DependencySource::Path { path, .. } => {
            let mut entry = InlineTable::new();
            entry.insert("path", path.clone().into());
            value(entry)
        }
    }
}

/// Mutable state threaded through the install pipeline.
///
/// Built from a loaded manifest, populated with the descriptor additions in
/// the compose step, mutated by the fetch collaborator, and extended with
/// composed installer operations before execution.
#[derive(Debug)]
pub struct WorkingContext {
    /// The project manifest being operated on
    pub manifest: Manifest,
    /// Dependency additions committed by the fetch step
    pub additions: Vec<DependencyDescriptor>,
    /// Installer operations composed for the executor, in request order
    pub operations: Vec<ComposedTask>,
}

impl WorkingContext {
    /// Start a context from a loaded manifest.
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            additions: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.manifest.root()
    }
}

/// Production fetch collaborator: commits additions to `ingot.toml` and
/// runs the configured fetch command.
#[derive(Debug, Default)]
pub struct ManifestFetcher;

impl ManifestFetcher {
    /// Create the fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DependencyFetcher for ManifestFetcher {
    fn apply_and_fetch(
        &self,
        mut ctx: WorkingContext,
        options: &RunOptions,
    ) -> Result<WorkingContext, IngotError> {
        let additions = ctx.additions.clone();
        for descriptor in &additions {
            let written = ctx.manifest.add_dependency(descriptor, options.append)?;
            if written {
                info!(package = %descriptor.name, "added to manifest");
            }
        }
        ctx.manifest.save()?;

        // Point of no return: the manifest now carries the additions.
        match ctx.manifest.fetch_command()? {
            Some(command) if !command.is_empty() => {
                info!(command = ?command, "fetching dependencies");
                run_fetch_command(ctx.root(), &command)?;
            }
            _ => {
                debug!("no fetch command configured, skipping fetch");
            }
        }

        Ok(ctx)
    }
}

fn run_fetch_command(root: &Path, command: &[String]) -> Result<(), IngotError> {
    let output = Command::new(&command[0])
        .args(&command[1..])
        .current_dir(root)
        .output()
        .map_err(|err| IngotError::DependencyFetchFailed {
            reason: format!("could not run `{}`: {err}", command.join(" ")),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
            format!("`{}` exited with {}", command.join(" "), output.status)
        } else {
            format!("`{}` failed: {stderr}", command.join(" "))
        };
        return Err(IngotError::DependencyFetchFailed { reason });
    }

    Ok(())
}
