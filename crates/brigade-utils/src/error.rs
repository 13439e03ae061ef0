//! Error taxonomy shared by the brigade crates
//!
//! Every library error implements [`UserFriendlyError`] so a shell can print a
//! message, context and suggestions, and can tell operational failures (rate
//! limits, outages, unusable model output) from non-operational ones (bad
//! configuration, missing credentials).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

use crate::types::AgentRole;

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Render an error as a multi-line block for terminal output.
#[must_use]
pub fn display_for_user(err: &dyn UserFriendlyError) -> String {
    let mut out = format!("Error [{}]: {}", err.category(), err.user_message());
    if let Some(context) = err.context() {
        out.push_str("\n\n");
        out.push_str(&context);
    }
    let suggestions = err.suggestions();
    if !suggestions.is_empty() {
        out.push_str("\n\nSuggestions:");
        for suggestion in suggestions {
            out.push_str("\n  - ");
            out.push_str(&suggestion);
        }
    }
    out
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Generation,
    Extraction,
    Orchestration,
    ResourceLimits,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Validation => write!(f, "Validation"),
            Self::Generation => write!(f, "Generation"),
            Self::Extraction => write!(f, "Extraction"),
            Self::Orchestration => write!(f, "Orchestration"),
            Self::ResourceLimits => write!(f, "Resource Limits"),
        }
    }
}

/// One violated field reported by schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// JSON pointer to the offending value (`""` for the document root)
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Join violations into a single `; `-separated line.
#[must_use]
pub fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration-related errors. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("No prompt template available for agent '{role}': {reason}")]
    MissingTemplate { role: AgentRole, reason: String },

    #[error("Prompt template for agent '{role}' references unknown placeholder '{name}'")]
    UnknownPlaceholder { role: AgentRole, name: String },

    #[error("Schema '{name}' could not be compiled: {reason}")]
    InvalidSchema { name: String, reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::MissingTemplate { role, reason } => {
                format!("Prompt template for '{role}' could not be loaded: {reason}")
            }
            Self::UnknownPlaceholder { role, name } => {
                format!("Prompt template for '{role}' uses unknown placeholder '{{{{{name}}}}}'")
            }
            Self::InvalidSchema { name, reason } => {
                format!("Schema '{name}' is not a valid JSON Schema: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) | Self::InvalidValue { .. } | Self::MissingRequired(_) => Some(
                "Configuration is read from a TOML file with [generation], [retry], [pipeline] and [agents.*] sections."
                    .to_string(),
            ),
            Self::NotFound { .. } => Some(
                "The configuration path was given explicitly and must exist.".to_string(),
            ),
            Self::MissingTemplate { .. } | Self::UnknownPlaceholder { .. } => Some(
                "Templates for every agent role are resolved before a run starts.".to_string(),
            ),
            Self::InvalidSchema { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Compare with the example configuration in the README".to_string(),
            ],
            Self::MissingRequired(key) => vec![format!("Add '{key}' to the configuration file")],
            Self::InvalidValue { .. } => vec![
                "Check the documentation for valid values for this option".to_string(),
                "Remove the option to use the default value".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Check the --config path".to_string(),
                "Omit --config to use built-in defaults".to_string(),
            ],
            Self::MissingTemplate { role, .. } => vec![
                format!("Create '{role}.md' in the prompts directory"),
                "Omit --prompts to use the built-in templates".to_string(),
            ],
            Self::UnknownPlaceholder { .. } => vec![
                "Supported placeholders: title, scope, constraints, context, brief, assignment, responsibilities, task_map, contributions".to_string(),
            ],
            Self::InvalidSchema { .. } => vec!["Validate the schema document against the JSON Schema meta-schema".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Transport messages that indicate a transient condition worth retrying
static TRANSIENT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(rate.?limit|quota|resource.?exhausted|timed?.?out|connection reset|econnreset|enotfound|\bdns\b|temporarily unavailable)",
    )
    .expect("transient message pattern is valid")
});

/// Errors that can occur while calling the generation service
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Non-transient transport failure (bad request, undecodable body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Transient network failure (connection reset, DNS lookup)
    #[error("Network error: {0}")]
    Network(String),

    /// Provider authentication failure (401, 403)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider temporarily unavailable (503)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Any other provider-side failure (500, 502, ...)
    #[error("Provider error (HTTP {status}): {message}")]
    ProviderError { status: u16, message: String },

    /// Invocation timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// The call returned no completion text
    #[error("Model returned an empty completion")]
    EmptyCompletion,

    /// The completion ended for a reason other than a normal stop
    #[error("Model completion ended abnormally: {reason}")]
    AbnormalCompletion { reason: String },

    /// Configuration error (missing key, bad endpoint)
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported feature or provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl LlmError {
    /// Whether another attempt may succeed.
    ///
    /// Rate limits, quota, timeouts, 503s and transient network failures are
    /// retryable. Everything else, including content-policy stops, is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_)
            | Self::ProviderQuota(_)
            | Self::ProviderOutage(_)
            | Self::Timeout { .. } => true,
            Self::Transport(message) => TRANSIENT_MESSAGE.is_match(message),
            Self::ProviderAuth(_)
            | Self::ProviderError { .. }
            | Self::EmptyCompletion
            | Self::AbnormalCompletion { .. }
            | Self::Misconfiguration(_)
            | Self::Unsupported(_) => false,
        }
    }

    /// Whether the failure is an expected operating condition rather than a
    /// deployment mistake. Auth, misconfiguration and unsupported features
    /// call for an operator, not a retry.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        !matches!(
            self,
            Self::ProviderAuth(_) | Self::Misconfiguration(_) | Self::Unsupported(_)
        )
    }
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Generation transport error: {msg}"),
            Self::Network(msg) => format!("Network error reaching the generation service: {msg}"),
            Self::ProviderAuth(msg) => format!("Generation service authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("Generation service quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("Generation service unavailable: {msg}"),
            Self::ProviderError { status, message } => {
                format!("Generation service failed with HTTP {status}: {message}")
            }
            Self::Timeout { duration } => {
                format!("Generation call timed out after {duration:?}")
            }
            Self::EmptyCompletion => "The model returned no text".to_string(),
            Self::AbnormalCompletion { reason } => {
                format!("The model stopped abnormally ({reason})")
            }
            Self::Misconfiguration(msg) => format!("Generation configuration error: {msg}"),
            Self::Unsupported(msg) => format!("Generation feature not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ProviderQuota(_) | Self::ProviderOutage(_) | Self::Network(_) | Self::Timeout { .. } => Some(
                "Transient failures were retried with exponential backoff before giving up."
                    .to_string(),
            ),
            Self::AbnormalCompletion { .. } => Some(
                "Safety filters, recitation checks and output-length cutoffs are treated as failures."
                    .to_string(),
            ),
            Self::ProviderAuth(_) | Self::Misconfiguration(_) => Some(
                "Credentials are read from the environment variable named in [generation] api_key_env."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ProviderQuota(_) | Self::ProviderOutage(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Check the provider's status page and usage dashboard".to_string(),
            ],
            Self::Network(_) | Self::Transport(_) => vec![
                "Verify network connectivity to the generation endpoint".to_string(),
                "Run with --verbose to see detailed error information".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase [generation] request_timeout_secs".to_string(),
                "Lower max_output_tokens for the slow agent".to_string(),
            ],
            Self::ProviderAuth(_) | Self::Misconfiguration(_) => vec![
                "Check that the API key environment variable is set and valid".to_string(),
            ],
            Self::ProviderError { .. } | Self::EmptyCompletion => {
                vec!["Retry the run; persistent failures indicate a provider issue".to_string()]
            }
            Self::AbnormalCompletion { .. } => vec![
                "Increase max_output_tokens if the reason is MAX_TOKENS".to_string(),
                "Rephrase the brief if the reason is SAFETY".to_string(),
            ],
            Self::Unsupported(_) => {
                vec!["Check the documentation for supported providers".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderAuth(_) | Self::Misconfiguration(_) | Self::Unsupported(_) => {
                ErrorCategory::Configuration
            }
            Self::ProviderQuota(_) => ErrorCategory::ResourceLimits,
            _ => ErrorCategory::Generation,
        }
    }
}
