//! Installation orchestration.
//!
//! [`Orchestrator::install`] drives one install request through six stages,
//! each committing before the next begins:
//!
//! 1. **Environment guard** — a set `--only` filter that excludes the
//!    current environment aborts before anything is touched.
//! 2. **Compose & validate** — the descriptor list is attached to the
//!    working context and the final [`RunOptions`] are derived from the
//!    request.
//! 3. **Apply & fetch** — the [`DependencyFetcher`] collaborator commits
//!    the additions to the project and fetches. This is the point of no
//!    return: a fetch failure is fatal, but the manifest stays mutated.
//! 4. **Installer discovery** — each requested package's installer task
//!    identifier is looked up in the capability table, partitioning the
//!    request into available and unavailable packages.
//! 5. **Composed execution** — discovered installers are composed into one
//!    operation set in request order, labeled with a singular/plural
//!    summary, and handed to the [`TaskExecutor`] (dry-run preview or
//!    apply). Installers may have ordering-sensitive side effects on shared
//!    project state, so request order is a guarantee.
//! 6. **Unavailable reporting** — packages without an installer are
//!    reported informationally, installer suffix trimmed; this never fails
//!    the run.
//!
//! Stages 4–6 are best-effort reporting over already-committed data: after
//! stage 3 succeeds, the pipeline no longer returns an error.

mod executor;

pub use executor::ConsoleExecutor;

use colored::Colorize;
use tracing::{debug, warn};

use crate::core::IngotError;
use crate::project::WorkingContext;
use crate::specifier::DependencyDescriptor;
use crate::task::{ComposedTask, Environment, TaskTable, installer_task_name, strip_install_suffix};

/// One install request as assembled by the CLI (or a programmatic caller).
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// Raw pass-through arguments forwarded to every composed installer
    /// (including switches like `--example` that ingot itself never
    /// interprets)
    pub argv: Vec<String>,
    /// Environment scope filter; `None` means no restriction
    pub only: Option<Vec<Environment>>,
    /// Auto-confirm instead of prompting before applying
    pub yes: bool,
    /// Keep existing manifest entries instead of overwriting them
    pub append: bool,
    /// Preview the composed operation set without applying it
    pub dry_run: bool,
}

/// The final option set applied by the fetch and execution collaborators.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Auto-confirm flag forwarded from the request
    pub yes: bool,
    /// Dry-run flag forwarded from the request
    pub dry_run: bool,
    /// Append flag forwarded from the request
    pub append: bool,
    /// Human-readable summary of the composed installers, set in stage 5
    pub title: Option<String>,
}

/// What one install run did.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Installer task identifiers that were found and composed, in request
    /// order (e.g. `ash.install`)
    pub available: Vec<String>,
    /// Requested packages with no installer, suffix-trimmed, in request
    /// order
    pub unavailable: Vec<String>,
    /// The option set that was applied
    pub options: RunOptions,
}

/// Commits dependency additions to the project and fetches them.
///
/// Implemented by [`ManifestFetcher`](crate::project::ManifestFetcher) in
/// production and by recording stubs in tests. Failure is fatal for the
/// run; the collaborator must not be invoked again afterwards.
pub trait DependencyFetcher {
    /// Apply `ctx.additions` to the project and fetch dependencies.
    ///
    /// # Errors
    ///
    /// [`IngotError::DependencyFetchFailed`] (or a manifest error) when the
    /// commit or the fetch fails.
    fn apply_and_fetch(
        &self,
        ctx: WorkingContext,
        options: &RunOptions,
    ) -> Result<WorkingContext, IngotError>;
}

/// Receives the composed operation set and either previews or applies it.
pub trait TaskExecutor {
    /// Run (or preview) `ctx.operations` under `options`.
    ///
    /// # Errors
    ///
    /// [`IngotError::TaskFailed`] when an installer exits unsuccessfully.
    /// The orchestrator downgrades this to a warning: execution happens
    /// after the point of no return.
    fn run(&self, ctx: &WorkingContext, options: &RunOptions) -> Result<(), IngotError>;
}

/// Drives the install pipeline over its collaborator seams.
pub struct Orchestrator<'a> {
    fetcher: &'a dyn DependencyFetcher,
    tasks: &'a TaskTable,
    executor: &'a dyn TaskExecutor,
}

impl<'a> Orchestrator<'a> {
    /// Wire an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        fetcher: &'a dyn DependencyFetcher,
        tasks: &'a TaskTable,
        executor: &'a dyn TaskExecutor,
    ) -> Self {
        Self {
            fetcher,
            tasks,
            executor,
        }
    }

    /// Run one install request to completion.
    ///
    /// `descriptors` is the normalized, caller-ordered dependency list;
    /// `current_env` is the environment the command runs in, passed down
    /// explicitly by the caller.
    ///
    /// # Errors
    ///
    /// Fatal stage-1..3 failures: [`IngotError::EnvironmentMismatch`],
    /// manifest errors, and [`IngotError::DependencyFetchFailed`]. After
    /// stage 3, errors no longer propagate.
    pub fn install(
        &self,
        descriptors: &[DependencyDescriptor],
        request: &InstallRequest,
        current_env: &Environment,
        ctx: WorkingContext,
    ) -> Result<InstallReport, IngotError> {
        // Stage 1: environment guard, before any mutation.
        if let Some(only) = &request.only {
            if !only.contains(current_env) {
                let allowed = only
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(IngotError::EnvironmentMismatch {
                    current: current_env.to_string(),
                    allowed,
                });
            }
        }

        // Stage 2: compose the working context and the final option set.
        let mut ctx = ctx;
        ctx.additions = descriptors.to_vec();
        let mut options = RunOptions {
            yes: request.yes,
            dry_run: request.dry_run,
            append: request.append,
            title: None,
        };

        // Stage 3: apply and fetch. Point of no return.
        let mut ctx = self.fetcher.apply_and_fetch(ctx, &options)?;

        // Stage 4: partition requested packages by installer availability.
        let mut available = Vec::new();
        let mut unavailable = Vec::new();
        for descriptor in descriptors {
            let task_name = installer_task_name(&descriptor.name);
            match self.tasks.find_task(&task_name) {
                Some(handle) => available.push(handle.clone()),
                None => unavailable.push(task_name),
            }
        }
        debug!(
            available = available.len(),
            unavailable = unavailable.len(),
            "installer discovery complete"
        );

        // Stage 5: compose and execute discovered installers in request order.
        let available_names: Vec<String> = available.iter().map(|h| h.name.clone()).collect();
        if !available.is_empty() {
            for handle in available {
                ctx.operations.push(ComposedTask {
                    handle,
                    argv: request.argv.clone(),
                });
            }
            options.title = Some(execution_summary(&available_names, request.dry_run));

            if let Err(err) = self.executor.run(&ctx, &options) {
                // Best-effort territory: the dependencies are already
                // committed, so surface the failure without failing the run.
                warn!("installer execution failed: {err}");
                eprintln!("{}: {err}", "warning".yellow().bold());
            }
        }

        // Stage 6: report packages without an installer. Never fails.
        let unavailable: Vec<String> = unavailable
            .iter()
            .map(|task| strip_install_suffix(task).to_string())
            .collect();
        if !unavailable.is_empty() {
            println!("{}", unavailable_summary(&unavailable));
        }

        Ok(InstallReport {
            available: available_names,
            unavailable,
            options,
        })
    }
}

/// Singular/plural summary for the composed installer set.
fn execution_summary(tasks: &[String], dry_run: bool) -> String {
    let verb = if dry_run { "would be executed" } else { "executed" };
    if tasks.len() == 1 {
        format!("The following installer was found and {verb}: `{}`", tasks[0])
    } else {
        let joined = tasks
            .iter()
            .map(|t| format!("`{t}`"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("The following installers were found and {verb}: {joined}")
    }
}

/// Singular/plural informational line for packages without installers.
fn unavailable_summary(packages: &[String]) -> String {
    if packages.len() == 1 {
        format!(
            "The package `{}` had no associated installer task.",
            packages[0]
        )
    } else {
        format!(
            "The following packages had no associated installer tasks: {}",
            packages.join(", ")
        )
    }
}
