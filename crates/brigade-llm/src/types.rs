//! Core types for the generation service abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use brigade_config::AgentProfile;
use brigade_utils::error::LlmError;
use brigade_utils::types::{AgentRole, Usage};

/// Why the service stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of the completion
    Stop,
    /// Output token limit reached
    MaxTokens,
    /// Blocked by a content filter
    Safety,
    /// Blocked for reproducing source material
    Recitation,
    /// Any other provider-specific reason
    Other(String),
}

impl FinishReason {
    /// Map a provider's upper-case reason string (`STOP`, `MAX_TOKENS`, ...).
    #[must_use]
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "STOP" | "stop" | "end_turn" => Self::Stop,
            "MAX_TOKENS" | "length" | "max_tokens" => Self::MaxTokens,
            "SAFETY" | "content_filter" => Self::Safety,
            "RECITATION" => Self::Recitation,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the completion ended normally.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::MaxTokens => write!(f, "max_tokens"),
            Self::Safety => write!(f, "safety"),
            Self::Recitation => write!(f, "recitation"),
            Self::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// Per-call generation options
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_instruction: Option<String>,
    /// Ask the service for JSON output
    pub structured_output: bool,
    /// Bound for a single attempt
    pub timeout: Duration,
}

impl GenerationOptions {
    /// Options for an agent profile with the given per-attempt timeout.
    #[must_use]
    pub fn from_profile(profile: &AgentProfile, timeout: Duration) -> Self {
        Self {
            model: profile.model.clone(),
            temperature: profile.temperature,
            max_output_tokens: profile.max_output_tokens,
            system_instruction: profile.system_instruction.clone(),
            structured_output: profile.structured_output,
            timeout,
        }
    }
}

/// One call to a generation service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Agent identifier, e.g. `planner` or `specialist:sauce`
    pub agent: String,
    pub role: AgentRole,
    /// Fully rendered prompt
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(
        agent: impl Into<String>,
        role: AgentRole,
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            agent: agent.into(),
            role,
            prompt: prompt.into(),
            options,
        }
    }
}

/// Raw output of a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub finish_reason: FinishReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Model that actually served the call
    pub model: String,
}

impl Generation {
    /// A normally-finished generation without usage counters.
    #[must_use]
    pub fn stop(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: FinishReason::Stop,
            usage: None,
            model: model.into(),
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A remote text-generation endpoint.
///
/// Implementations perform exactly one call per `generate`; retries,
/// timeouts and completion checks belong to [`crate::ModelInvoker`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Perform one generation call.
    ///
    /// # Errors
    ///
    /// Returns a classified `LlmError` for transport and provider failures.
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError>;

    /// Short provider name for logs
    fn name(&self) -> &str {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_provider("STOP"), FinishReason::Stop);
        assert_eq!(
            FinishReason::from_provider("MAX_TOKENS"),
            FinishReason::MaxTokens
        );
        assert_eq!(FinishReason::from_provider("SAFETY"), FinishReason::Safety);
        assert_eq!(
            FinishReason::from_provider("BLOCKLIST"),
            FinishReason::Other("BLOCKLIST".to_string())
        );
        assert!(FinishReason::Stop.is_normal());
        assert!(!FinishReason::MaxTokens.is_normal());
    }

    #[test]
    fn test_options_from_profile() {
        let profile = AgentProfile::default_for(AgentRole::Synthesizer);
        let options = GenerationOptions::from_profile(&profile, Duration::from_secs(9));
        assert_eq!(options.max_output_tokens, 8192);
        assert_eq!(options.timeout, Duration::from_secs(9));
        assert!(options.structured_output);
    }
}
