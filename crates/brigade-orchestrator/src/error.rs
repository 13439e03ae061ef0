//! Pipeline states and the errors a run can end with

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use brigade_extraction::ExtractionError;
use brigade_utils::error::{ConfigError, ErrorCategory, LlmError, UserFriendlyError};

use crate::brief::BriefValidationError;
use crate::recorder::ExecutionLog;

/// Where a run is. `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Planning,
    Specialists,
    Synthesis,
    Complete,
    Failed,
}

impl PipelineState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Specialists => "specialists",
            Self::Synthesis => "synthesis",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of failure, independent of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Invocation,
    Extraction,
    AggregateFailure,
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Invocation => "invocation",
            Self::Extraction => "extraction",
            Self::AggregateFailure => "aggregate_failure",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Classified reason a run did not produce a recipe
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] BriefValidationError),

    #[error("{agent}: {source}")]
    Invocation {
        agent: String,
        #[source]
        source: LlmError,
    },

    #[error("{agent}: {source}")]
    Extraction {
        agent: String,
        #[source]
        source: ExtractionError,
    },

    #[error(
        "{succeeded} of {} specialists succeeded, {required} required (attempted: {})",
        .attempted.len(),
        .attempted.join(", ")
    )]
    AggregateFailure {
        /// Every specialist agent id that was invoked
        attempted: Vec<String>,
        succeeded: usize,
        required: usize,
        /// False when every specialist failed for a non-operational reason
        operational: bool,
    },

    #[error("run exceeded its {limit:?} deadline during {state}")]
    Timeout { limit: Duration, state: PipelineState },
}

impl PipelineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Invocation { .. } => ErrorKind::Invocation,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::AggregateFailure { .. } => ErrorKind::AggregateFailure,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Agent whose call caused the failure, if any
    #[must_use]
    pub fn agent(&self) -> Option<&str> {
        match self {
            Self::Invocation { agent, .. } | Self::Extraction { agent, .. } => Some(agent),
            _ => None,
        }
    }

    /// Whether a shell should treat this as expected (retry and inform) rather
    /// than as a defect (alert and halt).
    #[must_use]
    pub fn is_operational(&self) -> bool {
        match self {
            Self::Configuration(_) => false,
            Self::Validation(_) | Self::Extraction { .. } | Self::Timeout { .. } => true,
            Self::Invocation { source, .. } => source.is_operational(),
            Self::AggregateFailure { operational, .. } => *operational,
        }
    }
}

impl UserFriendlyError for PipelineError {
    fn user_message(&self) -> String {
        match self {
            Self::Configuration(e) => e.user_message(),
            Self::Validation(e) => e.user_message(),
            Self::Invocation { agent, source } => format!("{agent} failed: {}", source.user_message()),
            Self::Extraction { agent, source } => format!("{agent} failed: {}", source.user_message()),
            Self::AggregateFailure {
                attempted,
                succeeded,
                required,
                ..
            } => format!(
                "Only {succeeded} of {} specialists produced usable output ({required} required)",
                attempted.len()
            ),
            Self::Timeout { limit, state } => {
                format!("The run did not finish within {}s (stopped during {state})", limit.as_secs())
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Configuration(e) => e.context(),
            Self::Validation(e) => e.context(),
            Self::Invocation { source, .. } => source.context(),
            Self::Extraction { source, .. } => source.context(),
            Self::AggregateFailure { attempted, .. } => {
                Some(format!("Attempted specialists: {}", attempted.join(", ")))
            }
            Self::Timeout { .. } => Some(
                "Calls still in flight at the deadline are recorded as failed steps with error \"timeout\"."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Configuration(e) => e.suggestions(),
            Self::Validation(e) => e.suggestions(),
            Self::Invocation { source, .. } => source.suggestions(),
            Self::Extraction { source, .. } => source.suggestions(),
            Self::AggregateFailure { .. } => vec![
                "Inspect the failed steps in the execution log".to_string(),
                "Lower [pipeline] min_specialist_successes if partial results are acceptable"
                    .to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase [pipeline] run_timeout_secs".to_string(),
                "Reduce the number of specialists or their max_output_tokens".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(e) => e.category(),
            Self::Validation(e) => e.category(),
            Self::Invocation { source, .. } => source.category(),
            Self::Extraction { source, .. } => source.category(),
            Self::AggregateFailure { .. } => ErrorCategory::Orchestration,
            Self::Timeout { .. } => ErrorCategory::ResourceLimits,
        }
    }
}

/// A failed run: the classified error plus the partial, finalized log
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunError {
    #[source]
    pub error: PipelineError,
    /// State the run failed in; `None` when it never entered the pipeline
    pub failed_state: Option<PipelineState>,
    pub log: ExecutionLog,
}

impl RunError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.error.is_operational()
    }
}

impl UserFriendlyError for RunError {
    fn user_message(&self) -> String {
        self.error.user_message()
    }

    fn context(&self) -> Option<String> {
        let failed = self.log.failed_steps().count();
        let summary = match self.failed_state {
            Some(state) => format!(
                "Failed during {state} after {} step(s), {failed} failed.",
                self.log.steps.len()
            ),
            None => "The run was rejected before planning started.".to_string(),
        };
        Some(match self.error.context() {
            Some(inner) => format!("{inner}\n{summary}"),
            None => summary,
        })
    }

    fn suggestions(&self) -> Vec<String> {
        self.error.suggestions()
    }

    fn category(&self) -> ErrorCategory {
        self.error.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_utils::types::AgentRole;

    #[test]
    fn test_operational_split() {
        let config = PipelineError::from(ConfigError::MissingTemplate {
            role: AgentRole::Planner,
            reason: "not found".to_string(),
        });
        assert!(!config.is_operational());
        assert_eq!(config.kind(), ErrorKind::Configuration);

        let quota = PipelineError::Invocation {
            agent: "planner".to_string(),
            source: LlmError::ProviderQuota("429".to_string()),
        };
        assert!(quota.is_operational());

        let auth = PipelineError::Invocation {
            agent: "planner".to_string(),
            source: LlmError::ProviderAuth("bad key".to_string()),
        };
        assert!(!auth.is_operational());
        assert_eq!(auth.agent(), Some("planner"));
    }

    #[test]
    fn test_aggregate_failure_names_every_specialist() {
        let err = PipelineError::AggregateFailure {
            attempted: vec!["specialist:a".to_string(), "specialist:b".to_string()],
            succeeded: 0,
            required: 1,
            operational: true,
        };
        let text = err.to_string();
        assert!(text.contains("specialist:a, specialist:b"), "{text}");
        assert_eq!(err.category(), ErrorCategory::Orchestration);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(PipelineState::Specialists).unwrap(),
            "specialists"
        );
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Synthesis.is_terminal());
    }
}
