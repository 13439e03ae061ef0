//! Exit codes for the brigade CLI
//!
//! Every failed run maps to one code so scripts can tell a bad configuration
//! (fix and rerun) from a rate-limited provider (wait and retry).

use brigade_orchestrator::{ErrorKind, PipelineError, RunError};

/// Process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Unexpected internal failure (I/O, runtime setup)
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid configuration, missing template or credentials
    pub const CONFIG: ExitCode = ExitCode(2);

    /// The brief failed validation
    pub const INVALID_BRIEF: ExitCode = ExitCode(3);

    /// The run exceeded its deadline
    pub const RUN_TIMEOUT: ExitCode = ExitCode(10);

    /// Model output could not be turned into the required structure (EX_DATAERR)
    pub const EXTRACTION: ExitCode = ExitCode(65);

    /// Too few specialists succeeded (EX_UNAVAILABLE)
    pub const AGGREGATE_FAILURE: ExitCode = ExitCode(69);

    /// A generation call failed after retries (EX_SOFTWARE)
    pub const INVOCATION: ExitCode = ExitCode(70);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Exit code for a pipeline failure.
    ///
    /// Invocation failures caused by credentials or provider setup count as
    /// configuration errors.
    #[must_use]
    pub fn for_pipeline_error(error: &PipelineError) -> Self {
        match error.kind() {
            ErrorKind::Configuration => Self::CONFIG,
            ErrorKind::Validation => Self::INVALID_BRIEF,
            ErrorKind::Timeout => Self::RUN_TIMEOUT,
            ErrorKind::Extraction => Self::EXTRACTION,
            ErrorKind::AggregateFailure => Self::AGGREGATE_FAILURE,
            ErrorKind::Invocation if !error.is_operational() => Self::CONFIG,
            ErrorKind::Invocation => Self::INVOCATION,
        }
    }
}

impl From<&RunError> for ExitCode {
    fn from(error: &RunError) -> Self {
        Self::for_pipeline_error(&error.error)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_llm::LlmError;
    use brigade_orchestrator::PipelineState;
    use std::time::Duration;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CONFIG.as_i32(), 2);
        assert_eq!(ExitCode::INVALID_BRIEF.as_i32(), 3);
        assert_eq!(ExitCode::RUN_TIMEOUT.as_i32(), 10);
        assert_eq!(ExitCode::EXTRACTION.as_i32(), 65);
        assert_eq!(ExitCode::AGGREGATE_FAILURE.as_i32(), 69);
        assert_eq!(ExitCode::INVOCATION.as_i32(), 70);
    }

    #[test]
    fn test_invocation_split_by_operational() {
        let quota = PipelineError::Invocation {
            agent: "planner".to_string(),
            source: LlmError::ProviderQuota("429".to_string()),
        };
        assert_eq!(ExitCode::for_pipeline_error(&quota), ExitCode::INVOCATION);

        let auth = PipelineError::Invocation {
            agent: "planner".to_string(),
            source: LlmError::ProviderAuth("401".to_string()),
        };
        assert_eq!(ExitCode::for_pipeline_error(&auth), ExitCode::CONFIG);
    }

    #[test]
    fn test_timeout_maps_to_ten() {
        let err = PipelineError::Timeout {
            limit: Duration::from_secs(1),
            state: PipelineState::Synthesis,
        };
        assert_eq!(i32::from(ExitCode::for_pipeline_error(&err)), 10);
    }
}
