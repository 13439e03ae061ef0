//! Phase pipeline: Planning, then specialist fan-out, then Synthesis
//!
//! ```text
//! Planning ──► Specialists ──► Synthesis ──► Complete
//!    │              │              │
//!    └──────────────┴──────────────┴──► Failed
//! ```
//!
//! The whole pipeline runs under one wall-clock deadline. Specialist calls
//! are started together and all of them settle before the pipeline moves on.
//! Whatever the outcome, the caller gets the finalized execution log, either
//! in [`RunOutput`] or inside [`RunError`].

use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use brigade_config::Config;
use brigade_extraction::{Extractor, SchemaValidator};
use brigade_llm::{
    AttemptEvent, GenerationOptions, GenerationRequest, GenerationService, ModelInvoker,
    invoker_for,
};
use brigade_prompt_template::{PromptSet, PromptSource};
use brigade_utils::error::ConfigError;
use brigade_utils::logging::{log_phase_complete, log_phase_error, log_phase_start, run_span};
use brigade_utils::types::AgentRole;

use crate::error::{PipelineError, PipelineState, RunError};
use crate::events::{EventKind, EventSink, Notifier};
use crate::model::{Brief, Recipe, SpecialistOutput, SpecialistResult, TaskMap};
use crate::prompts::{planner_prompt, specialist_prompt, synthesizer_prompt};
use crate::recorder::{ExecutionLog, ExecutionRecorder, ExecutionStep, millis};
use crate::schemas::Schemas;

/// Agent id of the planning call
pub const PLANNER_AGENT: &str = "planner";
/// Agent id of the synthesis call
pub const SYNTHESIZER_AGENT: &str = "synthesizer";

/// A successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub run_id: String,
    pub artifact: Recipe,
    pub log: ExecutionLog,
}

/// Everything one run needs, borrowed for its duration
struct RunContext<'a> {
    run_id: &'a str,
    brief: &'a Brief,
    prompts: &'a PromptSet,
    recorder: &'a ExecutionRecorder,
    notifier: &'a Notifier<'a>,
}

/// Runs briefs through the pipeline.
///
/// Holds no per-run state; concurrent runs on one `Orchestrator` are isolated.
pub struct Orchestrator {
    config: Config,
    invoker: ModelInvoker,
    prompts: Arc<dyn PromptSource>,
    schemas: Schemas,
    extractor: Extractor,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("service", &self.invoker.service_name())
            .field("policy", &self.invoker.policy())
            .field("run_timeout", &self.config.run_timeout())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Build an orchestrator from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is out of range or a
    /// built-in schema fails to compile.
    pub fn new(
        config: Config,
        service: Arc<dyn GenerationService>,
        prompts: Arc<dyn PromptSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let schemas = Schemas::builtin()?;
        let invoker = invoker_for(&config, service);
        let extractor = Extractor::new(config.pipeline.excerpt_chars);
        Ok(Self {
            config,
            invoker,
            prompts,
            schemas,
            extractor,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn schemas(&self) -> &Schemas {
        &self.schemas
    }

    /// Run `brief` through Planning, Specialists and Synthesis.
    ///
    /// Events go to `sink` if one is given; a slow or failing sink never
    /// affects the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] carrying the classified failure, the state it
    /// happened in and the partial log.
    pub async fn run(
        &self,
        brief: &Brief,
        sink: Option<&dyn EventSink>,
    ) -> Result<RunOutput, RunError> {
        let run_id = Uuid::new_v4().to_string();
        let span = run_span(&run_id);
        self.run_with_id(&run_id, brief, sink).instrument(span).await
    }

    async fn run_with_id(
        &self,
        run_id: &str,
        brief: &Brief,
        sink: Option<&dyn EventSink>,
    ) -> Result<RunOutput, RunError> {
        let recorder = ExecutionRecorder::new(run_id);
        let notifier = Notifier::new(run_id, Instant::now(), sink);

        if let Err(e) = brief.validate(&self.schemas.brief) {
            return Err(self.reject(e.into(), &recorder, &notifier));
        }
        let prompts = match PromptSet::resolve(self.prompts.as_ref()) {
            Ok(prompts) => prompts,
            Err(e) => return Err(self.reject(e.into(), &recorder, &notifier)),
        };

        info!(
            title = %brief.title,
            scope = %brief.scope,
            service = self.invoker.service_name(),
            "Run started"
        );

        let ctx = RunContext {
            run_id,
            brief,
            prompts: &prompts,
            recorder: &recorder,
            notifier: &notifier,
        };

        let limit = self.config.run_timeout();
        let outcome = match tokio::time::timeout(limit, self.pipeline(&ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let state = recorder.phase();
                let abandoned = recorder.abandon_pending("timeout");
                warn!(phase = %state, abandoned, "Run deadline exceeded");
                log_phase_error(
                    run_id,
                    state.as_str(),
                    "deadline exceeded",
                    recorder.elapsed().as_millis(),
                );
                Err(PipelineError::Timeout { limit, state })
            }
        };

        match outcome {
            Ok(artifact) => {
                recorder.enter(PipelineState::Complete);
                let log = recorder.finalize();
                let usage = log.total_usage();
                info!(
                    steps = log.steps.len(),
                    total_tokens = usage.total_tokens,
                    duration_ms = log.total_duration_ms,
                    "Run complete"
                );
                notifier.emit(EventKind::RunComplete {
                    duration_ms: log.total_duration_ms.unwrap_or_default(),
                    steps: log.steps.len(),
                    usage,
                });
                Ok(RunOutput {
                    run_id: run_id.to_string(),
                    artifact,
                    log,
                })
            }
            Err(error) => {
                let state = recorder.phase();
                recorder.enter(PipelineState::Failed);
                let log = recorder.finalize();
                warn!(
                    phase = %state,
                    kind = %error.kind(),
                    operational = error.is_operational(),
                    error = %error,
                    "Run failed"
                );
                notifier.emit(EventKind::RunError {
                    phase: Some(state),
                    error: error.to_string(),
                    duration_ms: log.total_duration_ms.unwrap_or_default(),
                });
                Err(RunError {
                    error,
                    failed_state: Some(state),
                    log,
                })
            }
        }
    }

    /// Fail a run that never entered the pipeline.
    fn reject(
        &self,
        error: PipelineError,
        recorder: &ExecutionRecorder,
        notifier: &Notifier<'_>,
    ) -> RunError {
        let log = recorder.finalize();
        warn!(kind = %error.kind(), error = %error, "Run rejected before planning");
        notifier.emit(EventKind::RunError {
            phase: None,
            error: error.to_string(),
            duration_ms: log.total_duration_ms.unwrap_or_default(),
        });
        RunError {
            error,
            failed_state: None,
            log,
        }
    }

    async fn pipeline(&self, ctx: &RunContext<'_>) -> Result<Recipe, PipelineError> {
        let task_map = self
            .phase(ctx, PipelineState::Planning, self.plan(ctx))
            .await?;
        let results = self
            .phase(ctx, PipelineState::Specialists, self.fan_out(ctx, &task_map))
            .await?;
        self.phase(
            ctx,
            PipelineState::Synthesis,
            self.synthesize(ctx, &task_map, &results),
        )
        .await
    }

    /// Enter `phase`, await `work` and report how it went.
    async fn phase<T>(
        &self,
        ctx: &RunContext<'_>,
        phase: PipelineState,
        work: impl Future<Output = Result<T, PipelineError>>,
    ) -> Result<T, PipelineError> {
        ctx.recorder.enter(phase);
        log_phase_start(ctx.run_id, phase.as_str());
        ctx.notifier.emit(EventKind::PhaseStart { phase });
        let started = Instant::now();

        let result = work.await;
        let elapsed = started.elapsed();
        match &result {
            Ok(_) => {
                log_phase_complete(ctx.run_id, phase.as_str(), elapsed.as_millis());
                ctx.notifier.emit(EventKind::PhaseComplete {
                    phase,
                    duration_ms: millis(elapsed),
                });
            }
            Err(e) => {
                log_phase_error(ctx.run_id, phase.as_str(), &e.to_string(), elapsed.as_millis());
            }
        }
        result
    }

    async fn plan(&self, ctx: &RunContext<'_>) -> Result<TaskMap, PipelineError> {
        let prompt = planner_prompt(ctx.prompts.get(AgentRole::Planner), ctx.brief)?;
        let task_map: TaskMap = self
            .call_agent(
                ctx,
                PLANNER_AGENT,
                AgentRole::Planner,
                PipelineState::Planning,
                prompt,
                &self.schemas.task_map,
            )
            .await?;
        info!(
            specialists = task_map.specialists.len(),
            complexity = ?task_map.complexity,
            "Plan ready"
        );
        Ok(task_map)
    }

    /// One call per assignment, all in flight together. A failed specialist
    /// becomes a missing result; only too few survivors fail the phase.
    async fn fan_out(
        &self,
        ctx: &RunContext<'_>,
        task_map: &TaskMap,
    ) -> Result<Vec<SpecialistResult>, PipelineError> {
        let agents = task_map.agent_ids();
        let template = ctx.prompts.get(AgentRole::Specialist);
        let prompts = task_map
            .specialists
            .iter()
            .map(|assignment| specialist_prompt(template, ctx.brief, assignment))
            .collect::<Result<Vec<_>, _>>()?;

        let calls = agents.iter().zip(prompts).map(|(agent, prompt)| async move {
            let outcome = self
                .call_agent::<SpecialistOutput>(
                    ctx,
                    agent,
                    AgentRole::Specialist,
                    PipelineState::Specialists,
                    prompt,
                    &self.schemas.specialist,
                )
                .await;
            (agent, outcome)
        });
        let settled = join_all(calls).await;

        let mut results = Vec::with_capacity(settled.len());
        let mut failures = Vec::new();
        for (agent, outcome) in settled {
            match outcome {
                Ok(output) => results.push(SpecialistResult {
                    specialist: agent.clone(),
                    contribution: output.contribution,
                    highlights: output.highlights,
                }),
                Err(error) => {
                    debug!(agent = %agent, error = %error, "Specialist dropped from synthesis");
                    failures.push(error);
                }
            }
        }

        let required = self
            .config
            .pipeline
            .min_specialist_successes
            .min(agents.len())
            .max(1);
        info!(
            attempted = agents.len(),
            succeeded = results.len(),
            required,
            "Specialists settled"
        );
        if results.len() < required {
            return Err(PipelineError::AggregateFailure {
                attempted: agents,
                succeeded: results.len(),
                required,
                operational: failures.is_empty()
                    || failures.iter().any(PipelineError::is_operational),
            });
        }
        Ok(results)
    }

    async fn synthesize(
        &self,
        ctx: &RunContext<'_>,
        task_map: &TaskMap,
        results: &[SpecialistResult],
    ) -> Result<Recipe, PipelineError> {
        let prompt = synthesizer_prompt(
            ctx.prompts.get(AgentRole::Synthesizer),
            ctx.brief,
            task_map,
            results,
        )?;
        self.call_agent(
            ctx,
            SYNTHESIZER_AGENT,
            AgentRole::Synthesizer,
            PipelineState::Synthesis,
            prompt,
            &self.schemas.recipe,
        )
        .await
    }

    /// Invoke one agent and extract its typed output.
    ///
    /// Failed attempts are recorded as they settle. The final successful
    /// attempt is recorded only after extraction, so a reply that cannot be
    /// extracted shows up as a failed step.
    async fn call_agent<T: DeserializeOwned>(
        &self,
        ctx: &RunContext<'_>,
        agent: &str,
        role: AgentRole,
        phase: PipelineState,
        prompt: String,
        schema: &dyn SchemaValidator,
    ) -> Result<T, PipelineError> {
        let options =
            GenerationOptions::from_profile(self.config.agent(role), self.config.request_timeout());
        ctx.notifier.emit(EventKind::InvocationRequest {
            agent: agent.to_string(),
            phase,
            model: options.model.clone(),
            prompt_chars: prompt.chars().count(),
        });
        let request = GenerationRequest::new(agent, role, prompt, options);

        let pending = ctx.recorder.begin(agent, phase);
        let started = Instant::now();
        let report = self
            .invoker
            .invoke_observed(&request, |event| match event {
                AttemptEvent::Started(attempt) => ctx.recorder.attempt_started(pending, attempt),
                AttemptEvent::Settled(attempt) => {
                    if let Some(error) = &attempt.error {
                        ctx.recorder.attempt_failed(pending, attempt);
                        ctx.notifier.emit(EventKind::AgentError {
                            agent: agent.to_string(),
                            phase,
                            error: error.clone(),
                            attempt: Some(attempt.attempt),
                        });
                    }
                }
            })
            .await;
        ctx.recorder.settle(pending);

        let generation = match report.result {
            Ok(generation) => generation,
            Err(source) => {
                warn!(
                    agent,
                    attempts = report.attempts.len(),
                    retryable = source.is_retryable(),
                    error = %source,
                    "Invocation failed"
                );
                return Err(PipelineError::Invocation {
                    agent: agent.to_string(),
                    source,
                });
            }
        };

        ctx.notifier.emit(EventKind::InvocationResponse {
            agent: agent.to_string(),
            phase,
            attempts: u32::try_from(report.attempts.len()).unwrap_or(u32::MAX),
            duration_ms: millis(started.elapsed()),
            usage: generation.usage,
        });

        let extracted = self.extractor.extract_as::<T>(&generation.text, Some(schema));
        let failure = extracted
            .as_ref()
            .err()
            .map(|e| format!("extraction failed: {e}"));
        if let Some(last) = report.attempts.last() {
            ctx.recorder
                .record(ExecutionStep::from_attempt(agent, phase, last, failure.clone()));
        }

        match extracted {
            Ok(extracted) => {
                for warning in &extracted.warnings {
                    warn!(agent, %warning, "Model output needed correction");
                }
                ctx.notifier.emit(EventKind::ParseSuccess {
                    agent: agent.to_string(),
                    phase,
                    warnings: extracted.warnings.iter().map(ToString::to_string).collect(),
                });
                Ok(extracted.value)
            }
            Err(source) => {
                warn!(agent, error = %source, "Could not extract model output");
                ctx.notifier.emit(EventKind::AgentError {
                    agent: agent.to_string(),
                    phase,
                    error: failure.unwrap_or_else(|| source.to_string()),
                    attempt: None,
                });
                Err(PipelineError::Extraction {
                    agent: agent.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::events::DebugEvent;
    use crate::model::BriefScope;
    use brigade_llm::{LlmError, ScriptedBackend, ScriptedReply};
    use brigade_prompt_template::{BuiltinPrompts, StaticPromptSource};
    use std::sync::Mutex;
    use std::time::Duration;

    const PLAN_AB: &str = r#"{"specialists": [
        {"name": "a", "responsibilities": ["stock"], "priority": 1},
        {"name": "b", "responsibilities": ["garnish"], "priority": 2}
    ], "complexity": "medium"}"#;
    const CONTRIBUTION: &str = r#"{"contribution": "Simmer for an hour.", "highlights": ["low heat"]}"#;
    const RECIPE: &str = r#"{"title": "Stock", "summary": "A clear stock.", "servings": 4,
        "ingredients": [{"item": "bones", "quantity": "1 kg"}], "steps": ["Simmer."]}"#;

    fn brief() -> Brief {
        Brief::new("Chicken stock", BriefScope::Technique)
    }

    fn orchestrator(config: Config, backend: &Arc<ScriptedBackend>) -> Orchestrator {
        Orchestrator::new(config, backend.clone(), Arc::new(BuiltinPrompts)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_bracket_the_run() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(PLANNER_AGENT, PLAN_AB)
                .reply("specialist:a", CONTRIBUTION)
                .reply("specialist:b", CONTRIBUTION)
                .reply(SYNTHESIZER_AGENT, RECIPE),
        );
        let events = Mutex::new(Vec::<DebugEvent>::new());
        let sink = |event: &DebugEvent| events.lock().unwrap().push(event.clone());

        let output = orchestrator(Config::minimal_for_testing(), &backend)
            .run(&brief(), Some(&sink))
            .await
            .unwrap();

        let events = events.into_inner().unwrap();
        assert!(events.iter().all(|e| e.run_id == output.run_id));
        assert_eq!(events.first().map(|e| e.kind.name()), Some("phase_start"));
        assert_eq!(events.last().map(|e| e.kind.name()), Some("run_complete"));
        let parsed = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::ParseSuccess { .. }))
            .count();
        assert_eq!(parsed, 4);
        let phases: Vec<PipelineState> = events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::PhaseComplete { phase, .. } => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                PipelineState::Planning,
                PipelineState::Specialists,
                PipelineState::Synthesis
            ]
        );
        assert_eq!(output.log.total_usage().total_tokens, 4 * 15);
        assert!(output.log.is_finalized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_marks_in_flight_calls_as_timeout() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(PLANNER_AGENT, PLAN_AB)
                .reply("specialist:a", CONTRIBUTION)
                .reply_after("specialist:b", Duration::from_secs(30), CONTRIBUTION),
        );
        let config = Config::builder()
            .run_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let err = orchestrator(config, &backend)
            .run(&brief(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.failed_state, Some(PipelineState::Specialists));
        assert!(err.is_operational());
        let b_steps: Vec<_> = err.log.steps_for("specialist:b").collect();
        assert_eq!(b_steps.len(), 1);
        assert!(!b_steps[0].success);
        assert_eq!(b_steps[0].error.as_deref(), Some("timeout"));
        assert!(err.log.steps_for("specialist:a").all(|s| s.success));
        assert_eq!(backend.calls(SYNTHESIZER_AGENT), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_backoff_adds_no_phantom_attempt() {
        let quota = ScriptedReply::Error(LlmError::ProviderQuota("429".to_string()));
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(PLANNER_AGENT, PLAN_AB)
                .always("specialist:a", quota)
                .reply("specialist:b", CONTRIBUTION),
        );
        // attempts at 0s and 1s, then a 2s backoff that outlives the deadline
        let config = Config::builder()
            .base_delay(Duration::from_secs(1))
            .run_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let err = orchestrator(config, &backend)
            .run(&brief(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        let a_steps: Vec<_> = err.log.steps_for("specialist:a").collect();
        assert_eq!(backend.calls("specialist:a"), 2);
        assert_eq!(a_steps.len(), 2);
        assert_eq!(
            a_steps.iter().map(|s| s.attempt).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(a_steps.iter().all(|s| s.error.as_deref() != Some("timeout")));
        assert!(err.log.steps_for("specialist:b").all(|s| s.success));
    }

    #[tokio::test]
    async fn test_missing_template_fails_before_planning() {
        let backend = Arc::new(ScriptedBackend::new().reply(PLANNER_AGENT, PLAN_AB));
        let prompts = StaticPromptSource::new().with(AgentRole::Planner, "Plan {{brief}}");
        let orchestrator =
            Orchestrator::new(Config::minimal_for_testing(), backend.clone(), Arc::new(prompts))
                .unwrap();

        let err = orchestrator.run(&brief(), None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_operational());
        assert_eq!(err.failed_state, None);
        assert!(err.log.steps.is_empty());
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_brief_never_reaches_the_model() {
        let backend = Arc::new(ScriptedBackend::new().reply(PLANNER_AGENT, PLAN_AB));
        let brief = Brief::new("", BriefScope::Dish);

        let err = orchestrator(Config::minimal_for_testing(), &backend)
            .run(&brief, None)
            .await
            .unwrap_err();

        match &err.error {
            PipelineError::Validation(e) => {
                assert!(e.violations.iter().any(|v| v.path == "/title"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_minimum_successes_threshold() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(PLANNER_AGENT, PLAN_AB)
                .reply("specialist:a", CONTRIBUTION)
                .fail("specialist:b", LlmError::ProviderError {
                    status: 400,
                    message: "bad request".to_string(),
                }),
        );
        let config = Config::builder()
            .base_delay(Duration::from_millis(1))
            .min_specialist_successes(2)
            .build()
            .unwrap();

        let err = orchestrator(config, &backend)
            .run(&brief(), None)
            .await
            .unwrap_err();

        match err.error {
            PipelineError::AggregateFailure {
                succeeded,
                required,
                ref attempted,
                ..
            } => {
                assert_eq!((succeeded, required), (1, 2));
                assert_eq!(attempted, &vec!["specialist:a", "specialist:b"]);
            }
            ref other => panic!("expected AggregateFailure, got {other:?}"),
        }
        assert_eq!(backend.calls(SYNTHESIZER_AGENT), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_specialists_failing_on_credentials_is_not_operational() {
        let auth = ScriptedReply::Error(LlmError::ProviderAuth("key revoked".to_string()));
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(PLANNER_AGENT, PLAN_AB)
                .always("specialist:a", auth.clone())
                .always("specialist:b", auth),
        );

        let err = orchestrator(Config::minimal_for_testing(), &backend)
            .run(&brief(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AggregateFailure);
        assert!(!err.is_operational());
        // auth failures are not retried
        assert_eq!(backend.calls("specialist:a"), 1);
        assert_eq!(backend.calls("specialist:b"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unextractable_synthesis_records_failed_step() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply(PLANNER_AGENT, PLAN_AB)
                .reply("specialist:a", CONTRIBUTION)
                .reply("specialist:b", CONTRIBUTION)
                .reply(SYNTHESIZER_AGENT, "I could not decide on a recipe."),
        );

        let err = orchestrator(Config::minimal_for_testing(), &backend)
            .run(&brief(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert_eq!(err.failed_state, Some(PipelineState::Synthesis));
        assert_eq!(err.error.agent(), Some(SYNTHESIZER_AGENT));
        let synth: Vec<_> = err.log.steps_in(PipelineState::Synthesis).collect();
        assert_eq!(synth.len(), 1);
        assert!(!synth[0].success);
        assert!(synth[0].usage.is_some());
        assert!(
            synth[0]
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("extraction failed"))
        );
    }
}
