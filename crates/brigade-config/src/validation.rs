use brigade_utils::error::ConfigError;
use brigade_utils::types::AgentRole;

use crate::model::Config;

fn invalid(key: impl Into<String>, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        value: value.into(),
    }
}

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::InvalidValue` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.provider.trim().is_empty() {
            return Err(invalid("generation.provider", "must not be empty"));
        }
        if self.generation.api_key_env.trim().is_empty() {
            return Err(invalid("generation.api_key_env", "must not be empty"));
        }
        if let Some(base_url) = &self.generation.base_url
            && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            return Err(invalid(
                "generation.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.generation.request_timeout_secs == 0 {
            return Err(invalid(
                "generation.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.generation.request_timeout_secs > 3600 {
            return Err(invalid(
                "generation.request_timeout_secs",
                "exceeds maximum limit of 3600 seconds (1 hour)",
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.max_attempts > 10 {
            return Err(invalid("retry.max_attempts", "exceeds maximum limit of 10"));
        }
        if self.retry.base_delay_ms > 60_000 {
            return Err(invalid(
                "retry.base_delay_ms",
                "exceeds maximum limit of 60000 ms",
            ));
        }

        if self.pipeline.run_timeout_secs == 0 {
            return Err(invalid("pipeline.run_timeout_secs", "must be greater than 0"));
        }
        if self.pipeline.run_timeout_secs > 7200 {
            return Err(invalid(
                "pipeline.run_timeout_secs",
                "exceeds maximum limit of 7200 seconds (2 hours)",
            ));
        }
        if self.pipeline.min_specialist_successes == 0 {
            return Err(invalid(
                "pipeline.min_specialist_successes",
                "must be at least 1",
            ));
        }
        if self.pipeline.excerpt_chars < 32 {
            return Err(invalid("pipeline.excerpt_chars", "must be at least 32"));
        }

        for role in AgentRole::ALL {
            let profile = self.agent(role);
            if profile.model.trim().is_empty() {
                return Err(invalid(format!("agents.{role}.model"), "must not be empty"));
            }
            if !(0.0..=2.0).contains(&profile.temperature) {
                return Err(invalid(
                    format!("agents.{role}.temperature"),
                    "must be between 0.0 and 2.0",
                ));
            }
            if profile.max_output_tokens == 0 || profile.max_output_tokens > 65_536 {
                return Err(invalid(
                    format!("agents.{role}.max_output_tokens"),
                    "must be between 1 and 65536",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::minimal_for_testing().validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = Config::default();
        config.agents.synthesizer.temperature = 2.5;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "agents.synthesizer.temperature");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_min_successes_rejected() {
        let mut config = Config::default();
        config.pipeline.min_specialist_successes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_scheme_required() {
        let mut config = Config::default();
        config.generation.base_url = Some("localhost:8080".to_string());
        assert!(config.validate().is_err());
    }
}
