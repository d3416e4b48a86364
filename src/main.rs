//! Ingot CLI entry point.
//!
//! Parses arguments, executes the selected command, and renders any
//! failure as a user-friendly error with suggestions before exiting
//! non-zero.

use anyhow::Result;
use clap::Parser;
use ingot::cli;
use ingot::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(err) => {
            let context = user_friendly_error(err);
            context.display();
            std::process::exit(1);
        }
    }
}
