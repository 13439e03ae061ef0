//! brigade - plan, fan out and synthesize structured recipes
//!
//! A brief goes through three phases: a planner model decides which
//! specialists are needed, every specialist is consulted concurrently, and a
//! synthesizer combines the surviving contributions into one [`Recipe`].
//! Every model call is retried on transient failures, every reply is
//! extracted and schema-checked, and every attempt lands in an
//! [`ExecutionLog`] that the caller receives even when the run fails.
//!
//! brigade can be used in two ways:
//! - **CLI**: `brigade run --brief brief.json`
//! - **Library**: build an [`Orchestrator`] and call [`Orchestrator::run`]
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use brigade::{Brief, BriefScope, BuiltinPrompts, Config, Orchestrator};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_path("brigade.toml")?;
//! let service = brigade::llm::from_config(&config)?;
//! let orchestrator = Orchestrator::new(config, service, Arc::new(BuiltinPrompts))?;
//!
//! let brief = Brief::new("Sunday roast", BriefScope::Menu).with_constraint("serves 6");
//! match orchestrator.run(&brief, None).await {
//!     Ok(output) => println!("{}", output.artifact.title),
//!     Err(err) => eprintln!("{err} after {} steps", err.log.steps.len()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Stable Public API
//!
//! - [`Orchestrator`], [`RunOutput`], [`RunError`], [`PipelineError`]
//! - [`Brief`], [`TaskMap`], [`SpecialistResult`], [`Recipe`]
//! - [`ExecutionLog`], [`ExecutionStep`]
//! - [`DebugEvent`], [`EventSink`], [`ChannelSink`]
//! - [`Config`] and [`ConfigBuilder`]
//! - [`ExitCode`]
//!
//! The member crates are re-exported as modules for embedders that need the
//! lower-level pieces (generation backends, the extractor, prompt sources).

pub mod cli;
pub mod exit_codes;

pub use brigade_config::{AgentProfile, Config, ConfigBuilder};
pub use brigade_orchestrator::{
    Assignment, Brief, BriefScope, BriefValidationError, ChannelSink, Complexity, DebugEvent,
    ErrorKind, EventKind, EventSink, ExecutionLog, ExecutionStep, Ingredient, Orchestrator,
    PipelineError, PipelineState, Recipe, RunError, RunOutput, SpecialistResult, TaskMap,
};
pub use brigade_prompt_template::{BuiltinPrompts, DirectoryPromptSource, PromptSource};
pub use brigade_utils::error::{ErrorCategory, UserFriendlyError};
pub use brigade_utils::types::{AgentRole, Usage};
pub use exit_codes::ExitCode;

/// Lower-level building blocks
pub use brigade_config as config;
pub use brigade_extraction as extraction;
pub use brigade_llm as llm;
pub use brigade_prompt_template as prompt_template;
