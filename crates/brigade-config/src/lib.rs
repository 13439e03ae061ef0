//! Configuration for brigade runs
//!
//! A [`Config`] is an explicit value handed to the orchestrator factory. It is
//! never read from global state, so pipelines can be built in tests without
//! touching the filesystem.
//!
//! Precedence: [`ConfigBuilder`] setters > TOML file > built-in defaults.
//!
//! ```toml
//! [generation]
//! provider = "gemini"
//! api_key_env = "GEMINI_API_KEY"
//! request_timeout_secs = 120
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 1000
//!
//! [pipeline]
//! run_timeout_secs = 600
//! min_specialist_successes = 1
//!
//! [agents.specialist]
//! model = "gemini-2.0-flash"
//! temperature = 0.8
//! ```

mod builder;
mod loader;
mod model;
mod validation;

pub use builder::ConfigBuilder;
pub use model::{
    AgentProfile, AgentsConfig, Config, GenerationConfig, PipelineSettings, RetryConfig,
};
