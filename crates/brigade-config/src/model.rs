use serde::{Deserialize, Serialize};
use std::time::Duration;

use brigade_utils::types::AgentRole;

/// Default generation model for all roles
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Resolved configuration for brigade runs.
///
/// Every field is populated; optional file values have already been merged
/// with built-in defaults and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Generation service connection settings.
    pub generation: GenerationConfig,
    /// Retry policy for generation calls.
    pub retry: RetryConfig,
    /// Run-level pipeline settings.
    pub pipeline: PipelineSettings,
    /// Per-role agent profiles.
    pub agents: AgentsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider name. Only `gemini` is built in.
    pub provider: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Override for the provider endpoint.
    pub base_url: Option<String>,
    /// Per-attempt timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per call, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Wall-clock deadline for a whole run.
    pub run_timeout_secs: u64,
    /// Surviving specialists required before synthesis may start.
    pub min_specialist_successes: usize,
    /// Characters of raw model output kept in extraction errors.
    pub excerpt_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            run_timeout_secs: 600,
            min_specialist_successes: 1,
            excerpt_chars: 500,
        }
    }
}

/// Model settings for one agent role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the service for JSON output.
    pub structured_output: bool,
    pub system_instruction: Option<String>,
}

impl AgentProfile {
    /// Built-in profile for a role.
    #[must_use]
    pub fn default_for(role: AgentRole) -> Self {
        let (temperature, max_output_tokens, system_instruction) = match role {
            AgentRole::Planner => (
                0.4,
                2048,
                "You plan recipe development work. Reply with JSON only.",
            ),
            AgentRole::Specialist => (
                0.7,
                2048,
                "You are a culinary specialist. Reply with JSON only.",
            ),
            AgentRole::Synthesizer => (
                0.5,
                8192,
                "You are the head chef who writes the final recipe. Reply with JSON only.",
            ),
        };
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature,
            max_output_tokens,
            structured_output: true,
            system_instruction: Some(system_instruction.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentsConfig {
    pub planner: AgentProfile,
    pub specialist: AgentProfile,
    pub synthesizer: AgentProfile,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            planner: AgentProfile::default_for(AgentRole::Planner),
            specialist: AgentProfile::default_for(AgentRole::Specialist),
            synthesizer: AgentProfile::default_for(AgentRole::Synthesizer),
        }
    }
}

impl AgentsConfig {
    #[must_use]
    pub fn get(&self, role: AgentRole) -> &AgentProfile {
        match role {
            AgentRole::Planner => &self.planner,
            AgentRole::Specialist => &self.specialist,
            AgentRole::Synthesizer => &self.synthesizer,
        }
    }

    pub fn get_mut(&mut self, role: AgentRole) -> &mut AgentProfile {
        match role {
            AgentRole::Planner => &mut self.planner,
            AgentRole::Specialist => &mut self.specialist,
            AgentRole::Synthesizer => &mut self.synthesizer,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            pipeline: PipelineSettings::default(),
            agents: AgentsConfig::default(),
        }
    }
}

impl Config {
    /// Profile for an agent role.
    #[must_use]
    pub fn agent(&self, role: AgentRole) -> &AgentProfile {
        self.agents.get(role)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.request_timeout_secs)
    }

    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.run_timeout_secs)
    }

    /// Minimal valid configuration for tests and embedding.
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        let mut config = Self::default();
        config.retry.base_delay_ms = 1;
        config.pipeline.run_timeout_secs = 30;
        config
    }
}

// On-disk representation: every value optional, merged over defaults.

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub generation: GenerationFile,
    #[serde(default)]
    pub retry: RetryFile,
    #[serde(default)]
    pub pipeline: PipelineFile,
    #[serde(default)]
    pub agents: AgentsFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GenerationFile {
    pub provider: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RetryFile {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PipelineFile {
    pub run_timeout_secs: Option<u64>,
    pub min_specialist_successes: Option<usize>,
    pub excerpt_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AgentsFile {
    pub planner: Option<AgentFile>,
    pub specialist: Option<AgentFile>,
    pub synthesizer: Option<AgentFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AgentFile {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub structured_output: Option<bool>,
    pub system_instruction: Option<String>,
}

impl AgentFile {
    pub(crate) fn merge_into(self, profile: &mut AgentProfile) {
        if let Some(model) = self.model {
            profile.model = model;
        }
        if let Some(temperature) = self.temperature {
            profile.temperature = temperature;
        }
        if let Some(max_output_tokens) = self.max_output_tokens {
            profile.max_output_tokens = max_output_tokens;
        }
        if let Some(structured_output) = self.structured_output {
            profile.structured_output = structured_output;
        }
        if let Some(system_instruction) = self.system_instruction {
            profile.system_instruction = if system_instruction.trim().is_empty() {
                None
            } else {
                Some(system_instruction)
            };
        }
    }
}
