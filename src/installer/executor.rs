//! Console executor: previews or applies the composed operation set.

use std::io::{BufRead, Write};
use std::process::Command;

use colored::Colorize;
use tracing::{debug, info};

use crate::core::IngotError;
use crate::project::WorkingContext;
use crate::task::ComposedTask;

use super::{RunOptions, TaskExecutor};

/// Production [`TaskExecutor`]: prints the summary, then either previews
/// the composed installers (dry run), prompts for confirmation (unless
/// `--yes`), or runs them sequentially from the project root.
#[derive(Debug, Default)]
pub struct ConsoleExecutor;

impl ConsoleExecutor {
    /// Create the executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TaskExecutor for ConsoleExecutor {
    fn run(&self, ctx: &WorkingContext, options: &RunOptions) -> Result<(), IngotError> {
        if let Some(title) = &options.title {
            println!("{}", title.bold());
        }

        if options.dry_run {
            println!("{}", "Dry run - nothing was executed.".yellow());
            for operation in &ctx.operations {
                println!("  would run: {}", render_operation(operation));
            }
            return Ok(());
        }

        if !options.yes && !confirm()? {
            println!("Aborted.");
            return Ok(());
        }

        for operation in &ctx.operations {
            info!(task = %operation.handle.name, "running installer");
            execute_operation(ctx, operation)?;
        }

        Ok(())
    }
}

fn render_operation(operation: &ComposedTask) -> String {
    if operation.argv.is_empty() {
        operation.handle.name.clone()
    } else {
        format!("{} {}", operation.handle.name, operation.argv.join(" "))
    }
}

/// Interactive confirmation prompt; declined means a clean no-op.
fn confirm() -> Result<bool, IngotError> {
    print!("Proceed with installation? [Y/n] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}

fn execute_operation(ctx: &WorkingContext, operation: &ComposedTask) -> Result<(), IngotError> {
    debug!(
        command = %operation.handle.command.display(),
        argv = ?operation.argv,
        "spawning installer task"
    );

    let status = Command::new(&operation.handle.command)
        .args(&operation.argv)
        .current_dir(ctx.root())
        .status()
        .map_err(|err| IngotError::TaskFailed {
            task: operation.handle.name.clone(),
            reason: format!("could not spawn: {err}"),
        })?;

    if !status.success() {
        return Err(IngotError::TaskFailed {
            task: operation.handle.name.clone(),
            reason: format!("exited with {status}"),
        });
    }

    Ok(())
}
