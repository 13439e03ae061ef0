//! Logging infrastructure for brigade
//!
//! Structured logging goes through `tracing`. The CLI installs a subscriber
//! once via [`init_tracing`]; library code only emits events, so embedders
//! keep full control of where logs end up.

use tracing::{Level, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `brigade=debug` when `verbose`,
/// `brigade=info` when not. Logs go to stderr so stdout stays machine-readable.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("brigade=debug,info")
            } else {
                EnvFilter::try_new("brigade=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_span_events(if verbose {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

/// Create a span covering one pipeline run
pub fn run_span(run_id: &str) -> tracing::Span {
    span!(Level::INFO, "pipeline_run", run_id = %run_id)
}

/// Log phase start with structured fields
pub fn log_phase_start(run_id: &str, phase: &str) {
    info!(run_id = %run_id, phase = %phase, "Starting phase");
}

/// Log phase completion with duration
pub fn log_phase_complete(run_id: &str, phase: &str, duration_ms: u128) {
    info!(
        run_id = %run_id,
        phase = %phase,
        duration_ms = %duration_ms,
        "Phase completed"
    );
}

/// Log phase failure with context
pub fn log_phase_error(run_id: &str, phase: &str, error: &str, duration_ms: u128) {
    error!(
        run_id = %run_id,
        phase = %phase,
        duration_ms = %duration_ms,
        error = %error,
        "Phase failed"
    );
}
