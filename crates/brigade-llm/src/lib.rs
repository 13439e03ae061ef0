//! Generation service abstraction and the retrying model invoker
//!
//! Backends implement [`GenerationService`] and perform exactly one remote
//! call per request. [`ModelInvoker`] layers the per-attempt timeout,
//! completion checks and bounded exponential backoff on top.

mod gemini_backend;
pub(crate) mod http_client;
mod invoker;
#[cfg(any(test, feature = "test-utils"))]
mod scripted;
mod types;

pub use brigade_utils::error::LlmError;
pub use gemini_backend::GeminiBackend;
pub use invoker::{
    AttemptEvent, AttemptRecord, InvocationReport, ModelInvoker, RetryPolicy, check_completion,
};
pub use types::{
    FinishReason, Generation, GenerationOptions, GenerationRequest, GenerationService,
};

// Test seam; not part of public API stability guarantees.
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub use scripted::{SCRIPTED_USAGE, ScriptedBackend, ScriptedReply};

use std::sync::Arc;

use brigade_config::Config;
use tracing::debug;

/// Providers `from_config` can construct
pub const SUPPORTED_PROVIDERS: &[&str] = &["gemini"];

/// Construct the generation service named by `[generation] provider`.
///
/// # Errors
///
/// Returns `LlmError::Unsupported` if the provider is unknown and
/// `LlmError::Misconfiguration` if provider-specific configuration is invalid
/// (for example a missing API key).
pub fn from_config(config: &Config) -> Result<Arc<dyn GenerationService>, LlmError> {
    let provider = config.generation.provider.as_str();
    debug!(provider, "Constructing generation service");
    match provider {
        "gemini" => Ok(Arc::new(GeminiBackend::new_from_config(config)?)),
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown generation provider '{unknown}'. Supported providers: {}.",
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}

/// Build a [`ModelInvoker`] for `service` using the `[retry]` settings.
#[must_use]
pub fn invoker_for(config: &Config, service: Arc<dyn GenerationService>) -> ModelInvoker {
    ModelInvoker::new(service, RetryPolicy::from_config(&config.retry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_unsupported() {
        let mut config = Config::default();
        config.generation.provider = "carrier-pigeon".to_string();
        match from_config(&config) {
            Err(LlmError::Unsupported(msg)) => assert!(msg.contains("carrier-pigeon")),
            Err(other) => panic!("expected Unsupported, got {other:?}"),
            Ok(_) => panic!("expected Unsupported"),
        }
    }

    #[test]
    fn test_invoker_uses_retry_config() {
        let mut config = Config::default();
        config.retry.max_attempts = 5;
        config.retry.base_delay_ms = 20;
        let invoker = invoker_for(&config, Arc::new(ScriptedBackend::new()));
        assert_eq!(invoker.policy().max_attempts, 5);
        assert_eq!(invoker.policy().base_delay.as_millis(), 20);
        assert_eq!(invoker.service_name(), "scripted");
    }
}
