//! Installer task capability table and environment model.
//!
//! Instead of looking installer procedures up dynamically at call time, the
//! packages that expose an installer are collected once at startup into an
//! explicit [`TaskTable`] mapping task identifiers to runnable
//! [`TaskHandle`]s, queried through the pure [`TaskTable::find_task`]
//! lookup. A package `foo` exposes its installer as the task `foo.install`
//! (see [`installer_task_name`]).
//!
//! The production table is populated by [`discover_tasks`], which scans the
//! project's `tasks/` directory for task scripts. Tests build tables by
//! hand with [`TaskTable::register`].
//!
//! [`Environment`] models the run environment the install command executes
//! in. It is always passed down explicitly from the caller — the
//! orchestrator never reads ambient process state — so the environment
//! guard stays testable.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::constants::{INSTALLER_TASK_SUFFIX, TASKS_DIR};
use crate::core::IngotError;

/// A symbolic run environment (`--only` filter values, `INGOT_ENV`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Development environment (the default)
    Dev,
    /// Test environment
    Test,
    /// Production environment
    Prod,
    /// Any other symbolic environment name
    Other(String),
}

impl Environment {
    /// Environment from an optional caller-supplied value, defaulting to dev.
    #[must_use]
    pub fn from_option(value: Option<&str>) -> Self {
        value.map_or(Self::Dev, Self::from_name)
    }

    fn from_name(name: &str) -> Self {
        match name.trim() {
            "dev" => Self::Dev,
            "test" => Self::Test,
            "prod" => Self::Prod,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Test => write!(f, "test"),
            Self::Prod => write!(f, "prod"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A runnable installer task: an identifier plus the script that backs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    /// Task identifier (e.g. `ash.install`)
    pub name: String,
    /// Executable backing the task
    pub command: PathBuf,
}

/// An installer task composed into the operation set, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedTask {
    /// The task to run
    pub handle: TaskHandle,
    /// Pass-through CLI arguments forwarded to the task
    pub argv: Vec<String>,
}

/// Capability table mapping task identifiers to handles.
///
/// A `BTreeMap` keeps iteration deterministic for reporting; execution
/// order is still request order, not table order.
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    tasks: BTreeMap<String, TaskHandle>,
}

impl TaskTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task handle under its own name.
    pub fn register(&mut self, handle: TaskHandle) {
        self.tasks.insert(handle.name.clone(), handle);
    }

    /// Pure lookup: is this task known?
    #[must_use]
    pub fn find_task(&self, name: &str) -> Option<&TaskHandle> {
        self.tasks.get(name)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no tasks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate over registered tasks in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskHandle> {
        self.tasks.values()
    }
}

/// Derive the installer task identifier for a package name.
#[must_use]
pub fn installer_task_name(package: &str) -> String {
    format!("{package}{INSTALLER_TASK_SUFFIX}")
}

/// Strip a trailing installer suffix from a task identifier, if present.
#[must_use]
pub fn strip_install_suffix(task: &str) -> &str {
    task.strip_suffix(INSTALLER_TASK_SUFFIX).unwrap_or(task)
}

/// Populate a [`TaskTable`] from the project's `tasks/` directory.
///
/// Every regular file is registered as a task named after the file, with a
/// trailing `.sh` stripped (`tasks/ash.install.sh` and `tasks/ash.install`
/// both register `ash.install`). A missing directory yields an empty table;
/// fetched packages simply have no installers yet.
///
/// # Errors
///
/// Returns [`IngotError::FileSystemError`] when the directory exists but
/// cannot be read.
pub fn discover_tasks(project_root: &Path) -> Result<TaskTable, IngotError> {
    let tasks_dir = project_root.join(TASKS_DIR);
    let mut table = TaskTable::new();

    if !tasks_dir.is_dir() {
        debug!(dir = %tasks_dir.display(), "no tasks directory, capability table is empty");
        return Ok(table);
    }

    let entries = std::fs::read_dir(&tasks_dir).map_err(|err| IngotError::FileSystemError {
        operation: "scan tasks directory".to_string(),
        reason: err.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|err| IngotError::FileSystemError {
            operation: "scan tasks directory".to_string(),
            reason: err.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let task_name = file_name.strip_suffix(".sh").unwrap_or(file_name);

        debug!(task = task_name, script = %path.display(), "registering task");
        table.register(TaskHandle {
            name: task_name.to_string(),
            command: path.clone(),
        });
    }

    Ok(table)
}
