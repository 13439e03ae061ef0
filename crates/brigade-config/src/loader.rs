use std::path::Path;

use brigade_utils::error::ConfigError;
use brigade_utils::types::AgentRole;
use tracing::debug;

use crate::model::{Config, ConfigFile};

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist,
    /// `ConfigError::InvalidFile` if it cannot be read or parsed, and
    /// `ConfigError::InvalidValue` if a value is out of range.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidFile(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loading configuration file");
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFile` for syntax errors or unknown keys and
    /// `ConfigError::InvalidValue` for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFile(e.to_string()))?;
        let config = Self::merge(file);
        config.validate()?;
        Ok(config)
    }

    fn merge(file: ConfigFile) -> Self {
        let mut config = Self::default();

        let generation = file.generation;
        if let Some(provider) = generation.provider {
            config.generation.provider = provider;
        }
        if let Some(api_key_env) = generation.api_key_env {
            config.generation.api_key_env = api_key_env;
        }
        if generation.base_url.is_some() {
            config.generation.base_url = generation.base_url;
        }
        if let Some(timeout) = generation.request_timeout_secs {
            config.generation.request_timeout_secs = timeout;
        }

        if let Some(max_attempts) = file.retry.max_attempts {
            config.retry.max_attempts = max_attempts;
        }
        if let Some(base_delay_ms) = file.retry.base_delay_ms {
            config.retry.base_delay_ms = base_delay_ms;
        }

        if let Some(run_timeout) = file.pipeline.run_timeout_secs {
            config.pipeline.run_timeout_secs = run_timeout;
        }
        if let Some(min) = file.pipeline.min_specialist_successes {
            config.pipeline.min_specialist_successes = min;
        }
        if let Some(excerpt) = file.pipeline.excerpt_chars {
            config.pipeline.excerpt_chars = excerpt;
        }

        let agents = file.agents;
        for (role, section) in [
            (AgentRole::Planner, agents.planner),
            (AgentRole::Specialist, agents.specialist),
            (AgentRole::Synthesizer, agents.synthesizer),
        ] {
            if let Some(section) = section {
                section.merge_into(config.agents.get_mut(role));
            }
        }

        config
    }
}
