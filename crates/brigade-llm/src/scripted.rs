//! Deterministic generation backend for tests
//!
//! Replies are queued per agent identifier and consumed in order. An agent
//! with an empty queue falls back to its repeating reply, if one was set.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use brigade_utils::error::LlmError;
use brigade_utils::types::Usage;

use crate::types::{FinishReason, Generation, GenerationRequest, GenerationService};

/// Usage reported for every scripted completion
pub const SCRIPTED_USAGE: Usage = Usage {
    prompt_tokens: 10,
    completion_tokens: 5,
    total_tokens: 15,
};

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Finish(String, FinishReason),
    Error(LlmError),
    Delayed(Duration, Box<ScriptedReply>),
}

#[derive(Debug, Default)]
struct State {
    queues: HashMap<String, VecDeque<ScriptedReply>>,
    repeating: HashMap<String, ScriptedReply>,
    calls: HashMap<String, Vec<tokio::time::Instant>>,
    prompts: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    state: Mutex<State>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(self, agent: &str, reply: ScriptedReply) -> Self {
        self.lock()
            .queues
            .entry(agent.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    #[must_use]
    pub fn reply(self, agent: &str, text: impl Into<String>) -> Self {
        self.push(agent, ScriptedReply::Text(text.into()))
    }

    #[must_use]
    pub fn fail(self, agent: &str, error: LlmError) -> Self {
        self.push(agent, ScriptedReply::Error(error))
    }

    #[must_use]
    pub fn finish(self, agent: &str, text: impl Into<String>, reason: FinishReason) -> Self {
        self.push(agent, ScriptedReply::Finish(text.into(), reason))
    }

    #[must_use]
    pub fn reply_after(self, agent: &str, delay: Duration, text: impl Into<String>) -> Self {
        self.push(
            agent,
            ScriptedReply::Delayed(delay, Box::new(ScriptedReply::Text(text.into()))),
        )
    }

    /// Reply used whenever the agent's queue is empty.
    #[must_use]
    pub fn always(self, agent: &str, reply: ScriptedReply) -> Self {
        self.lock().repeating.insert(agent.to_string(), reply);
        self
    }

    /// Number of `generate` calls made for `agent`.
    #[must_use]
    pub fn calls(&self, agent: &str) -> usize {
        self.lock().calls.get(agent).map_or(0, Vec::len)
    }

    /// Total calls across all agents.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().map(Vec::len).sum()
    }

    /// Tokio clock readings at each call for `agent`.
    #[must_use]
    pub fn call_times(&self, agent: &str) -> Vec<tokio::time::Instant> {
        self.lock().calls.get(agent).cloned().unwrap_or_default()
    }

    /// Prompts received for `agent`, in call order.
    #[must_use]
    pub fn prompts(&self, agent: &str) -> Vec<String> {
        self.lock().prompts.get(agent).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn next_reply(&self, request: &GenerationRequest) -> Option<ScriptedReply> {
        let mut state = self.lock();
        state
            .calls
            .entry(request.agent.clone())
            .or_default()
            .push(tokio::time::Instant::now());
        state
            .prompts
            .entry(request.agent.clone())
            .or_default()
            .push(request.prompt.clone());
        let queued = state
            .queues
            .get_mut(&request.agent)
            .and_then(VecDeque::pop_front);
        queued.or_else(|| state.repeating.get(&request.agent).cloned())
    }
}

#[async_trait]
impl GenerationService for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let mut reply = self.next_reply(request).ok_or_else(|| {
            LlmError::Unsupported(format!("no scripted reply for agent '{}'", request.agent))
        })?;

        loop {
            match reply {
                ScriptedReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                ScriptedReply::Text(text) => {
                    return Ok(Generation::stop(text, &request.options.model)
                        .with_usage(SCRIPTED_USAGE));
                }
                ScriptedReply::Finish(text, finish_reason) => {
                    return Ok(Generation {
                        text,
                        finish_reason,
                        usage: Some(SCRIPTED_USAGE),
                        model: request.options.model.clone(),
                    });
                }
                ScriptedReply::Error(error) => return Err(error),
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
