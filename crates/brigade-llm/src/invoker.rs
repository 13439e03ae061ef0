//! Retrying model invoker
//!
//! Wraps a [`GenerationService`] with a per-attempt timeout, completion checks
//! and bounded exponential backoff. The invoker emits no events and touches no
//! shared run state: it reports what happened through [`InvocationReport`] and
//! an optional per-attempt observer supplied by the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use brigade_config::RetryConfig;
use brigade_utils::error::LlmError;
use brigade_utils::redaction::redact_error_message;
use brigade_utils::types::Usage;

use crate::types::{Generation, GenerationRequest, GenerationService};

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per invocation, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
        }
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Outcome of a single attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Backoff slept before this attempt started
    #[serde(rename = "backoff_ms", serialize_with = "serialize_millis")]
    pub backoff: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Redacted error text; `None` on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptRecord {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Progress of one invocation, as seen by an observer
#[derive(Debug, Clone, Copy)]
pub enum AttemptEvent<'a> {
    /// Attempt `n` is about to call the service
    Started(u32),
    /// An attempt finished, successfully or not
    Settled(&'a AttemptRecord),
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Every attempt of one invocation plus its final result
#[derive(Debug, Clone)]
pub struct InvocationReport {
    pub agent: String,
    pub attempts: Vec<AttemptRecord>,
    pub result: Result<Generation, LlmError>,
}

impl InvocationReport {
    /// Total usage across all attempts
    #[must_use]
    pub fn usage(&self) -> Usage {
        let mut total = Usage::default();
        for usage in self.attempts.iter().filter_map(|a| a.usage) {
            total += usage;
        }
        total
    }
}

/// Check that a generation is a usable completion.
///
/// # Errors
///
/// `AbnormalCompletion` when the finish reason is anything but a normal stop,
/// otherwise `EmptyCompletion` when no text came back.
pub fn check_completion(generation: &Generation) -> Result<(), LlmError> {
    if !generation.finish_reason.is_normal() {
        return Err(LlmError::AbnormalCompletion {
            reason: generation.finish_reason.to_string(),
        });
    }
    if generation.text.trim().is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(())
}

/// Retrying front end for a generation service
#[derive(Clone)]
pub struct ModelInvoker {
    service: Arc<dyn GenerationService>,
    policy: RetryPolicy,
}

impl ModelInvoker {
    #[must_use]
    pub fn new(service: Arc<dyn GenerationService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Invoke with retries.
    pub async fn invoke(&self, request: &GenerationRequest) -> InvocationReport {
        self.invoke_observed(request, |_| {}).await
    }

    /// Invoke with retries, telling `on_attempt` when each attempt starts and
    /// when it settles. Backoff sleeps fall between a `Settled` and the next
    /// `Started`.
    ///
    /// Retryable failures sleep `policy.delay_for(n)` before attempt `n + 1`.
    /// Non-retryable failures and the last attempt end the invocation.
    pub async fn invoke_observed<F>(
        &self,
        request: &GenerationRequest,
        mut on_attempt: F,
    ) -> InvocationReport
    where
        F: FnMut(AttemptEvent<'_>) + Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = Vec::with_capacity(max_attempts as usize);
        let mut backoff = Duration::ZERO;
        let mut attempt = 0;

        let result = loop {
            attempt += 1;
            let started_at = Utc::now();
            let clock = Instant::now();

            debug!(
                agent = %request.agent,
                attempt,
                max_attempts,
                service = self.service.name(),
                "Generation attempt"
            );

            on_attempt(AttemptEvent::Started(attempt));
            let (usage, outcome) = self.attempt_once(request).await;
            let record = AttemptRecord {
                attempt,
                started_at,
                duration: clock.elapsed(),
                backoff,
                usage,
                error: outcome
                    .as_ref()
                    .err()
                    .map(|e| redact_error_message(&e.to_string())),
            };
            on_attempt(AttemptEvent::Settled(&record));
            attempts.push(record);

            match outcome {
                Ok(generation) => break Ok(generation),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    backoff = self.policy.delay_for(attempt);
                    warn!(
                        agent = %request.agent,
                        attempt,
                        delay_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %redact_error_message(&error.to_string()),
                        "Retryable generation failure, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => {
                    debug!(
                        agent = %request.agent,
                        attempt,
                        retryable = error.is_retryable(),
                        "Generation failed"
                    );
                    break Err(error);
                }
            }
        };

        InvocationReport {
            agent: request.agent.clone(),
            attempts,
            result,
        }
    }

    async fn attempt_once(
        &self,
        request: &GenerationRequest,
    ) -> (Option<Usage>, Result<Generation, LlmError>) {
        let timeout = request.options.timeout;
        match tokio::time::timeout(timeout, self.service.generate(request)).await {
            Err(_) => (None, Err(LlmError::Timeout { duration: timeout })),
            Ok(Err(error)) => (None, Err(error)),
            Ok(Ok(generation)) => {
                let usage = generation.usage;
                match check_completion(&generation) {
                    Ok(()) => (usage, Ok(generation)),
                    Err(error) => (usage, Err(error)),
                }
            }
        }
    }
}
