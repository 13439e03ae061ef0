//! Shared HTTP client for HTTP-based generation backends
//!
//! One `reqwest::Client` is built per backend and reused for every call so
//! connections are pooled. This layer makes exactly one request per call and
//! maps failures onto `LlmError`; retrying is the invoker's job.

use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use brigade_utils::error::LlmError;
use brigade_utils::redaction::redact_error_message;

/// Default connect timeout (30 seconds)
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bytes of an error body kept in error messages
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn new() -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Send one request and map non-success statuses to `LlmError`.
    pub async fn send(
        &self,
        request_builder: reqwest::RequestBuilder,
        timeout: Duration,
        provider_name: &str,
    ) -> Result<Response, LlmError> {
        let request = request_builder
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to build request: {e}")))?;

        debug!(
            provider = provider_name,
            timeout_secs = timeout.as_secs(),
            "Executing HTTP request"
        );

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => return Err(map_transport_error(&e, timeout, provider_name)),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = redact_error_message(truncate(&body, ERROR_BODY_LIMIT));
        warn!(
            provider = provider_name,
            status = status.as_u16(),
            "Provider returned error status"
        );
        Err(map_status(status, provider_name, &detail))
    }
}

/// Map an HTTP error status to an `LlmError` variant
///
/// - 401/403 → `ProviderAuth`
/// - 429 → `ProviderQuota`
/// - 503 → `ProviderOutage`
/// - other 4xx → `Transport`
/// - other 5xx → `ProviderError`
pub(crate) fn map_status(status: StatusCode, provider_name: &str, detail: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::ProviderAuth(format!(
            "{provider_name} authentication failed: {status}"
        )),
        StatusCode::TOO_MANY_REQUESTS => LlmError::ProviderQuota(format!(
            "{provider_name} rate limit exceeded: {status} {detail}"
        )),
        StatusCode::SERVICE_UNAVAILABLE => LlmError::ProviderOutage(format!(
            "{provider_name} unavailable: {status} {detail}"
        )),
        s if s.is_client_error() => LlmError::Transport(format!(
            "{provider_name} returned client error: {status} {detail}"
        )),
        s => LlmError::ProviderError {
            status: s.as_u16(),
            message: format!("{provider_name}: {detail}"),
        },
    }
}

fn map_transport_error(e: &reqwest::Error, timeout: Duration, provider_name: &str) -> LlmError {
    if e.is_timeout() {
        return LlmError::Timeout { duration: timeout };
    }
    let message = format!(
        "{provider_name} request failed: {}",
        redact_error_message(&e.to_string())
    );
    if e.is_connect() || e.is_request() {
        LlmError::Network(message)
    } else {
        LlmError::Transport(message)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_construction() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_map_status() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "gemini", ""),
            LlmError::ProviderAuth(_)
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, "gemini", ""),
            LlmError::ProviderAuth(_)
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, "gemini", ""),
            LlmError::ProviderQuota(_)
        ));
        assert!(matches!(
            map_status(StatusCode::SERVICE_UNAVAILABLE, "gemini", ""),
            LlmError::ProviderOutage(_)
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, "gemini", ""),
            LlmError::Transport(_)
        ));
        assert!(matches!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, "gemini", ""),
            LlmError::ProviderError { status: 500, .. }
        ));
    }

    #[test]
    fn test_status_retryability() {
        assert!(map_status(StatusCode::TOO_MANY_REQUESTS, "gemini", "").is_retryable());
        assert!(map_status(StatusCode::SERVICE_UNAVAILABLE, "gemini", "").is_retryable());
        assert!(!map_status(StatusCode::BAD_REQUEST, "gemini", "").is_retryable());
        assert!(!map_status(StatusCode::UNAUTHORIZED, "gemini", "").is_retryable());
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "ééééé";
        assert_eq!(truncate(text, 3), "é");
        assert_eq!(truncate("short", 10), "short");
    }
}
