//! Execution recording
//!
//! Every invocation attempt becomes one [`ExecutionStep`]. Steps are appended
//! and never changed. The recorder also remembers which invocations are still
//! in flight so that a run cut short by its deadline can close them out as
//! `success=false, error="timeout"` instead of leaving them unaccounted for.
//! An invocation sleeping between attempts has nothing in flight, so the
//! deadline adds no step for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use brigade_llm::AttemptRecord;
use brigade_utils::types::Usage;

use crate::error::PipelineState;

/// One invocation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub agent: String,
    /// Pipeline phase that issued the call
    pub action: PipelineState,
    /// 1-based attempt number within the invocation
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ExecutionStep {
    /// Step for a settled attempt. `failure` overrides a successful attempt
    /// whose output was later rejected.
    #[must_use]
    pub fn from_attempt(
        agent: &str,
        action: PipelineState,
        attempt: &AttemptRecord,
        failure: Option<String>,
    ) -> Self {
        let error = failure.or_else(|| attempt.error.clone());
        Self {
            agent: agent.to_string(),
            action,
            attempt: attempt.attempt,
            timestamp: attempt.started_at,
            duration_ms: millis(attempt.duration),
            success: error.is_none(),
            error,
            usage: attempt.usage,
        }
    }
}

/// Ordered steps of one run plus its timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<u64>,
    pub steps: Vec<ExecutionStep>,
}

impl ExecutionLog {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            finished_at: None,
            total_duration_ms: None,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.total_duration_ms.is_some()
    }

    /// Token counters summed over every step that reported them
    #[must_use]
    pub fn total_usage(&self) -> Usage {
        let mut total = Usage::default();
        for usage in self.steps.iter().filter_map(|s| s.usage) {
            total += usage;
        }
        total
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &ExecutionStep> {
        self.steps.iter().filter(|s| !s.success)
    }

    pub fn steps_for<'a>(&'a self, agent: &'a str) -> impl Iterator<Item = &'a ExecutionStep> {
        self.steps.iter().filter(move |s| s.agent == agent)
    }

    /// Steps issued during `phase`
    pub fn steps_in(&self, phase: PipelineState) -> impl Iterator<Item = &ExecutionStep> {
        self.steps.iter().filter(move |s| s.action == phase)
    }
}

/// Handle for an invocation that has started but not settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PendingId(u64);

#[derive(Debug)]
struct Pending {
    agent: String,
    action: PipelineState,
    attempt: u32,
    started_at: DateTime<Utc>,
    clock: tokio::time::Instant,
    /// False while backing off between attempts
    in_flight: bool,
}

#[derive(Debug)]
struct RecorderState {
    log: ExecutionLog,
    pending: BTreeMap<PendingId, Pending>,
    next_id: u64,
    phase: PipelineState,
}

/// Shared, append-only recorder for one run.
///
/// Concurrent specialist tasks append through `&self`; the mutex serializes
/// the appends.
#[derive(Debug)]
pub struct ExecutionRecorder {
    state: Mutex<RecorderState>,
    clock: tokio::time::Instant,
}

impl ExecutionRecorder {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(RecorderState {
                log: ExecutionLog::new(run_id),
                pending: BTreeMap::new(),
                next_id: 0,
                phase: PipelineState::Planning,
            }),
            clock: tokio::time::Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current pipeline state
    #[must_use]
    pub fn phase(&self) -> PipelineState {
        self.lock().phase
    }

    pub fn enter(&self, phase: PipelineState) {
        self.lock().phase = phase;
    }

    pub fn record(&self, step: ExecutionStep) {
        self.lock().log.steps.push(step);
    }

    /// Mark an invocation as in flight with its first attempt.
    pub fn begin(&self, agent: &str, action: PipelineState) -> PendingId {
        let mut state = self.lock();
        let id = PendingId(state.next_id);
        state.next_id += 1;
        state.pending.insert(
            id,
            Pending {
                agent: agent.to_string(),
                action,
                attempt: 1,
                started_at: Utc::now(),
                clock: tokio::time::Instant::now(),
                in_flight: true,
            },
        );
        id
    }

    /// Attempt `attempt` of a tracked invocation has reached the service.
    pub fn attempt_started(&self, id: PendingId, attempt: u32) {
        if let Some(pending) = self.lock().pending.get_mut(&id) {
            pending.attempt = attempt;
            pending.started_at = Utc::now();
            pending.clock = tokio::time::Instant::now();
            pending.in_flight = true;
        }
    }

    /// Record a failed attempt. The invocation stays tracked but idle until
    /// its next attempt starts.
    pub fn attempt_failed(&self, id: PendingId, attempt: &AttemptRecord) {
        let mut state = self.lock();
        let Some(pending) = state.pending.get_mut(&id) else {
            return;
        };
        pending.in_flight = false;
        let step = ExecutionStep::from_attempt(&pending.agent, pending.action, attempt, None);
        state.log.steps.push(step);
    }

    /// The invocation settled; stop tracking it.
    pub fn settle(&self, id: PendingId) {
        self.lock().pending.remove(&id);
    }

    /// Close every in-flight attempt as a failed step with `reason` and stop
    /// tracking all invocations, idle ones included.
    ///
    /// Returns how many steps were added.
    pub fn abandon_pending(&self, reason: &str) -> usize {
        let mut state = self.lock();
        let pending = std::mem::take(&mut state.pending);
        let mut count = 0;
        for p in pending.into_values().filter(|p| p.in_flight) {
            count += 1;
            state.log.steps.push(ExecutionStep {
                agent: p.agent,
                action: p.action,
                attempt: p.attempt,
                timestamp: p.started_at,
                duration_ms: millis(p.clock.elapsed()),
                success: false,
                error: Some(reason.to_string()),
                usage: None,
            });
        }
        count
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Copy of the log so far
    #[must_use]
    pub fn snapshot(&self) -> ExecutionLog {
        self.lock().log.clone()
    }

    /// Set end time and total duration and hand the log out.
    #[must_use]
    pub fn finalize(&self) -> ExecutionLog {
        let mut state = self.lock();
        state.log.finished_at = Some(Utc::now());
        state.log.total_duration_ms = Some(millis(self.clock.elapsed()));
        state.log.clone()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(n: u32, error: Option<&str>) -> AttemptRecord {
        AttemptRecord {
            attempt: n,
            started_at: Utc::now(),
            duration: Duration::from_millis(25),
            backoff: Duration::ZERO,
            usage: error.is_none().then(|| Usage::new(3, 4)),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_failed_attempts_are_recorded_in_order() {
        let recorder = ExecutionRecorder::new("run");
        let id = recorder.begin("specialist:a", PipelineState::Specialists);
        recorder.attempt_failed(id, &attempt(1, Some("429")));
        recorder.attempt_failed(id, &attempt(2, Some("429")));
        recorder.settle(id);

        let log = recorder.finalize();
        assert_eq!(log.steps.len(), 2);
        assert_eq!(log.steps[1].attempt, 2);
        assert_eq!(log.failed_steps().count(), 2);
        assert!(log.is_finalized());
        assert_eq!(recorder.pending_count(), 0);
    }

    #[test]
    fn test_abandon_pending_marks_timeouts() {
        let recorder = ExecutionRecorder::new("run");
        let a = recorder.begin("specialist:a", PipelineState::Specialists);
        let _b = recorder.begin("specialist:b", PipelineState::Specialists);
        recorder.attempt_failed(a, &attempt(1, Some("503")));
        recorder.attempt_started(a, 2);

        assert_eq!(recorder.abandon_pending("timeout"), 2);
        let log = recorder.finalize();
        let timeouts: Vec<_> = log
            .steps
            .iter()
            .filter(|s| s.error.as_deref() == Some("timeout"))
            .collect();
        assert_eq!(timeouts.len(), 2);
        assert!(timeouts.iter().all(|s| !s.success));
        assert_eq!(log.steps_for("specialist:a").count(), 2);
        assert_eq!(log.steps_for("specialist:a").last().unwrap().attempt, 2);
    }

    #[test]
    fn test_abandon_skips_invocations_backing_off() {
        let recorder = ExecutionRecorder::new("run");
        let a = recorder.begin("specialist:a", PipelineState::Specialists);
        recorder.attempt_failed(a, &attempt(1, Some("429")));

        assert_eq!(recorder.abandon_pending("timeout"), 0);
        assert_eq!(recorder.pending_count(), 0);
        let log = recorder.finalize();
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].error.as_deref(), Some("429"));
    }

    #[test]
    fn test_extraction_failure_overrides_success() {
        let step = ExecutionStep::from_attempt(
            "planner",
            PipelineState::Planning,
            &attempt(1, None),
            Some("unparseable".to_string()),
        );
        assert!(!step.success);
        assert_eq!(step.usage, Some(Usage::new(3, 4)));
    }

    #[test]
    fn test_total_usage_sums_steps() {
        let recorder = ExecutionRecorder::new("run");
        for agent in ["planner", "synthesizer"] {
            recorder.record(ExecutionStep::from_attempt(
                agent,
                PipelineState::Planning,
                &attempt(1, None),
                None,
            ));
        }
        assert_eq!(recorder.snapshot().total_usage(), Usage::new(6, 8));
    }
}
