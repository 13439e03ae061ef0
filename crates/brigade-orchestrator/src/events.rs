//! Debug event notifications
//!
//! Events are observational only. The pipeline hands each one to the sink
//! and moves on; a sink that panics is logged and ignored, and a channel
//! sink whose receiver is gone simply drops the event.

use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::warn;

use brigade_utils::types::Usage;

use crate::error::PipelineState;
use crate::recorder::millis;

/// One lifecycle notification for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugEvent {
    pub run_id: String,
    /// Milliseconds since the run started
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    PhaseStart {
        phase: PipelineState,
    },
    PhaseComplete {
        phase: PipelineState,
        duration_ms: u64,
    },
    InvocationRequest {
        agent: String,
        phase: PipelineState,
        model: String,
        prompt_chars: usize,
    },
    InvocationResponse {
        agent: String,
        phase: PipelineState,
        attempts: u32,
        duration_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    ParseSuccess {
        agent: String,
        phase: PipelineState,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    AgentError {
        agent: String,
        phase: PipelineState,
        error: String,
        /// Attempt that failed; `None` for failures after the call returned
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attempt: Option<u32>,
    },
    RunComplete {
        duration_ms: u64,
        steps: usize,
        usage: Usage,
    },
    RunError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<PipelineState>,
        error: String,
        duration_ms: u64,
    },
}

impl EventKind {
    /// The `type` tag as serialized
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PhaseStart { .. } => "phase_start",
            Self::PhaseComplete { .. } => "phase_complete",
            Self::InvocationRequest { .. } => "invocation_request",
            Self::InvocationResponse { .. } => "invocation_response",
            Self::ParseSuccess { .. } => "parse_success",
            Self::AgentError { .. } => "agent_error",
            Self::RunComplete { .. } => "run_complete",
            Self::RunError { .. } => "run_error",
        }
    }
}

/// Receiver of debug events.
///
/// `emit` must not block. Any `Fn(&DebugEvent)` closure is a sink; use
/// [`ChannelSink`] to forward events to a task.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &DebugEvent);
}

impl<F> EventSink for F
where
    F: Fn(&DebugEvent) + Send + Sync,
{
    fn emit(&self, event: &DebugEvent) {
        self(event);
    }
}

/// Forwards events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink(pub UnboundedSender<DebugEvent>);

impl EventSink for ChannelSink {
    fn emit(&self, event: &DebugEvent) {
        // A closed receiver just means nobody is listening any more.
        let _ = self.0.send(event.clone());
    }
}

/// Stamps events with the run id and offset and shields the run from the sink
pub(crate) struct Notifier<'a> {
    run_id: String,
    started: Instant,
    sink: Option<&'a dyn EventSink>,
}

impl<'a> Notifier<'a> {
    pub(crate) fn new(run_id: &str, started: Instant, sink: Option<&'a dyn EventSink>) -> Self {
        Self {
            run_id: run_id.to_string(),
            started,
            sink,
        }
    }

    pub(crate) fn emit(&self, kind: EventKind) {
        let Some(sink) = self.sink else {
            return;
        };
        let event = DebugEvent {
            run_id: self.run_id.clone(),
            elapsed_ms: millis(self.started.elapsed()),
            kind,
        };
        if catch_unwind(AssertUnwindSafe(|| sink.emit(&event))).is_err() {
            warn!(
                run_id = %self.run_id,
                event = event.kind.name(),
                "Event sink panicked; event dropped"
            );
        }
    }
}
