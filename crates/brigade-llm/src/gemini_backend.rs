//! Gemini HTTP backend
//!
//! Calls the `models/{model}:generateContent` endpoint. The API key travels in
//! the `x-goog-api-key` header so it never appears in request URLs or logs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use brigade_config::Config;
use brigade_utils::error::LlmError;
use brigade_utils::types::Usage;

use crate::http_client::HttpClient;
use crate::types::{FinishReason, Generation, GenerationRequest, GenerationService};

/// Default Gemini API endpoint
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
        })
    }

    /// Create a new Gemini backend from configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the API key environment
    /// variable is unset or empty.
    pub fn new_from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key_env = &config.generation.api_key_env;
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LlmError::Misconfiguration(format!(
                    "Gemini API key not found in environment variable '{api_key_env}'. \
                     Please set this variable or configure a different api_key_env in [generation]."
                ))
            })?;

        Self::new(api_key, config.generation.base_url.clone())
    }

    fn url_for(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    fn build_body(request: &GenerationRequest) -> GeminiRequest {
        let options = &request.options;
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: options
                .system_instruction
                .as_ref()
                .map(|text| GeminiSystemInstruction {
                    parts: vec![GeminiPart { text: text.clone() }],
                }),
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
                response_mime_type: options
                    .structured_output
                    .then(|| "application/json".to_string()),
            },
        }
    }
}

/// Turn a decoded response into a `Generation`.
///
/// No candidate at all yields empty text; a prompt-level block becomes the
/// finish reason so the invoker reports it as an abnormal completion.
fn into_generation(response: GeminiResponse, model: &str) -> Generation {
    let usage = response.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u
            .total_token_count
            .unwrap_or(u.prompt_token_count + u.candidates_token_count),
    });

    let model = response.model_version.unwrap_or_else(|| model.to_string());

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        let finish_reason = match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) if reason == "SAFETY" => FinishReason::Safety,
            Some(reason) => FinishReason::Other(format!("prompt blocked: {reason}")),
            None => FinishReason::Stop,
        };
        return Generation {
            text: String::new(),
            finish_reason,
            usage,
            model,
        };
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Generation {
        text,
        finish_reason: candidate
            .finish_reason
            .as_deref()
            .map_or(FinishReason::Stop, FinishReason::from_provider),
        usage,
        model,
    }
}

#[async_trait]
impl GenerationService for GeminiBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let model = &request.options.model;
        debug!(
            provider = "gemini",
            agent = %request.agent,
            model = %model,
            temperature = request.options.temperature,
            max_output_tokens = request.options.max_output_tokens,
            structured = request.options.structured_output,
            "Invoking Gemini backend"
        );

        let builder = self
            .client
            .inner()
            .post(self.url_for(model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&Self::build_body(request));

        let response = self
            .client
            .send(builder, request.options.timeout, "gemini")
            .await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse Gemini response: {e}")))?;

        let generation = into_generation(body, model);
        debug!(
            provider = "gemini",
            agent = %request.agent,
            finish_reason = %generation.finish_reason,
            usage = ?generation.usage,
            "Gemini invocation completed"
        );
        Ok(generation)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    total_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
