//! CLI entry point and dispatch
//!
//! `run()` parses arguments, installs logging, creates the tokio runtime and
//! dispatches to a command. It handles all output, including errors; the
//! binary only maps the returned code to the process exit status.

use clap::Parser;

use brigade_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;
use crate::exit_codes::ExitCode;

/// Main CLI execution function.
///
/// # Errors
///
/// Returns the exit code of the failed command after printing its error.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: logging not initialised: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    rt.block_on(async {
        match cli.command {
            Commands::Run {
                brief,
                config,
                prompts,
                events,
            } => {
                commands::execute_run_command(
                    &brief,
                    config.as_deref(),
                    prompts.as_deref(),
                    events,
                )
                .await
            }
            Commands::ValidateBrief { brief } => commands::execute_validate_brief_command(&brief),
        }
    })
}
