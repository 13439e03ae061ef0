//! Command implementations
//!
//! Each command prints its own output and returns the exit code on failure.
//! Machine-readable JSON goes to stdout; human-readable errors, logs and
//! debug events go to stderr.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use brigade_config::Config;
use brigade_orchestrator::{
    Brief, ChannelSink, DebugEvent, EventSink, Orchestrator, RunError, Schemas,
};
use brigade_prompt_template::{BuiltinPrompts, DirectoryPromptSource, PromptSource};
use brigade_utils::error::{UserFriendlyError, display_for_user};

use crate::exit_codes::ExitCode;

fn read_file(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))
}

/// Print a library error for the user and pick its exit code.
fn report(error: &dyn UserFriendlyError, code: ExitCode) -> ExitCode {
    eprintln!("{}", display_for_user(error));
    code
}

fn report_internal(error: &anyhow::Error) -> ExitCode {
    eprintln!("✗ {error:#}");
    ExitCode::INTERNAL
}

fn print_json(value: &serde_json::Value) -> Result<(), ExitCode> {
    let text = serde_json::to_string_pretty(value)
        .context("Failed to serialize output")
        .map_err(|e| report_internal(&e))?;
    println!("{text}");
    Ok(())
}

/// Read and validate a brief file.
fn load_brief(path: &Path, schemas: &Schemas) -> Result<Brief, ExitCode> {
    let text = read_file(path, "brief").map_err(|e| report_internal(&e))?;
    Brief::from_json(&text, &schemas.brief).map_err(|e| report(&e, ExitCode::INVALID_BRIEF))
}

pub(crate) fn execute_validate_brief_command(path: &Path) -> Result<(), ExitCode> {
    let schemas = Schemas::builtin().map_err(|e| report(&e, ExitCode::CONFIG))?;
    let text = read_file(path, "brief").map_err(|e| report_internal(&e))?;

    match Brief::from_json(&text, &schemas.brief) {
        Ok(brief) => print_json(&json!({
            "valid": true,
            "brief": brief,
        })),
        Err(e) => {
            print_json(&json!({
                "valid": false,
                "violations": e.violations,
            }))?;
            Err(report(&e, ExitCode::INVALID_BRIEF))
        }
    }
}

pub(crate) async fn execute_run_command(
    brief_path: &Path,
    config_path: Option<&Path>,
    prompts_dir: Option<&Path>,
    events: bool,
) -> Result<(), ExitCode> {
    let config = match config_path {
        Some(path) => Config::from_path(path).map_err(|e| report(&e, ExitCode::CONFIG))?,
        None => Config::default(),
    };

    let schemas = Schemas::builtin().map_err(|e| report(&e, ExitCode::CONFIG))?;
    let brief = load_brief(brief_path, &schemas)?;

    let prompts: Arc<dyn PromptSource> = match prompts_dir {
        Some(dir) => Arc::new(DirectoryPromptSource::new(dir)),
        None => Arc::new(BuiltinPrompts),
    };
    let service = brigade_llm::from_config(&config).map_err(|e| report(&e, ExitCode::CONFIG))?;
    let orchestrator =
        Orchestrator::new(config, service, prompts).map_err(|e| report(&e, ExitCode::CONFIG))?;
    debug!(?orchestrator, "Orchestrator ready");

    let outcome = if events {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<DebugEvent>();
        let writer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Ok(line) = serde_json::to_string(&event) {
                    eprintln!("{line}");
                }
            }
        });
        let sink = ChannelSink(tx);
        let outcome = orchestrator
            .run(&brief, Some(&sink as &dyn EventSink))
            .await;
        // Closing the channel lets the writer drain and stop.
        drop(sink);
        if let Err(e) = writer.await {
            debug!(error = %e, "Event writer stopped early");
        }
        outcome
    } else {
        orchestrator.run(&brief, None).await
    };

    match outcome {
        Ok(output) => print_json(&json!({
            "run_id": output.run_id,
            "artifact": output.artifact,
            "log": output.log,
        })),
        Err(error) => {
            print_json(&failure_json(&error))?;
            Err(report(&error, ExitCode::from(&error)))
        }
    }
}

fn failure_json(error: &RunError) -> serde_json::Value {
    json!({
        "run_id": error.log.run_id,
        "error": {
            "kind": error.kind(),
            "message": error.to_string(),
            "operational": error.is_operational(),
            "failed_state": error.failed_state,
        },
        "log": error.log,
    })
}
