use std::time::Duration;

use brigade_utils::error::ConfigError;
use brigade_utils::types::AgentRole;

use crate::model::{AgentProfile, Config};

/// Builder for programmatic configuration.
///
/// Starts from built-in defaults (or an existing config) and validates on
/// [`build`](Self::build).
///
/// ```rust
/// use brigade_config::Config;
/// use std::time::Duration;
///
/// let config = Config::builder()
///     .max_attempts(4)
///     .run_timeout(Duration::from_secs(120))
///     .build()
///     .expect("valid config");
/// assert_eq!(config.retry.max_attempts, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-loaded configuration (e.g. a file) and override on top.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.config.generation.provider = provider.into();
        self
    }

    #[must_use]
    pub fn api_key_env(mut self, name: impl Into<String>) -> Self {
        self.config.generation.api_key_env = name.into();
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.generation.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation.request_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.retry.base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.config.pipeline.run_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn min_specialist_successes(mut self, min: usize) -> Self {
        self.config.pipeline.min_specialist_successes = min;
        self
    }

    #[must_use]
    pub fn excerpt_chars(mut self, chars: usize) -> Self {
        self.config.pipeline.excerpt_chars = chars;
        self
    }

    #[must_use]
    pub fn agent(mut self, role: AgentRole, profile: AgentProfile) -> Self {
        *self.config.agents.get_mut(role) = profile;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for out-of-range settings.
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_file_config() {
        let file = Config::from_toml_str("[retry]\nmax_attempts = 5\n").unwrap();
        let config = ConfigBuilder::from_config(file)
            .base_delay(Duration::from_millis(10))
            .build()
            .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 10);
    }

    #[test]
    fn test_builder_validates() {
        let err = Config::builder().min_specialist_successes(0).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_builder_replaces_agent_profile() {
        let mut profile = AgentProfile::default_for(AgentRole::Planner);
        profile.model = "planner-model".to_string();
        let config = Config::builder()
            .agent(AgentRole::Planner, profile)
            .build()
            .unwrap();
        assert_eq!(config.agent(AgentRole::Planner).model, "planner-model");
    }
}
