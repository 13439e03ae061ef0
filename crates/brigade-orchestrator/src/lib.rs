//! Brief-to-recipe orchestration for brigade
//!
//! This crate wires the model invoker, the extractor and the prompt templates
//! into a three-phase pipeline:
//!
//! - **Planning**: one planner call produces a [`TaskMap`]
//! - **Specialists**: one call per assignment, all concurrent, settle-all
//! - **Synthesis**: one call turns the brief, plan and surviving
//!   contributions into a [`Recipe`]
//!
//! Every attempt is recorded as an [`ExecutionStep`]. Lifecycle
//! [`DebugEvent`]s go to an optional [`EventSink`] passed into
//! [`Orchestrator::run`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use brigade_config::Config;
//! use brigade_orchestrator::{Brief, BriefScope, Orchestrator};
//! use brigade_prompt_template::BuiltinPrompts;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let service = brigade_llm::from_config(&config)?;
//! let orchestrator = Orchestrator::new(config, service, Arc::new(BuiltinPrompts))?;
//!
//! let brief = Brief::new("Weeknight ramen", BriefScope::Dish).with_constraint("vegetarian");
//! let output = orchestrator.run(&brief, None).await?;
//! println!("{} ({} steps)", output.artifact.title, output.log.steps.len());
//! # Ok(())
//! # }
//! ```

mod brief;
mod error;
mod events;
mod model;
mod pipeline;
mod prompts;
mod recorder;
mod schemas;

pub use brief::BriefValidationError;
pub use error::{ErrorKind, PipelineError, PipelineState, RunError};
pub use events::{ChannelSink, DebugEvent, EventKind, EventSink};
pub use model::{
    Assignment, Brief, BriefScope, Complexity, Ingredient, Recipe, SpecialistResult, TaskMap,
};
pub use pipeline::{Orchestrator, PLANNER_AGENT, RunOutput, SYNTHESIZER_AGENT};
pub use recorder::{ExecutionLog, ExecutionRecorder, ExecutionStep, PendingId};
pub use schemas::{
    MAX_CONSTRAINTS, MAX_CONTEXT_CHARS, MAX_TITLE_CHARS, Schemas, brief_schema, recipe_schema,
    specialist_schema, task_map_schema,
};
