//! Language-model client seam and its implementations.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pharmaq_core::config::LlmConfig;
use pharmaq_core::types::ChatMessage;

use crate::error::LlmError;

/// A remote model that answers a role-tagged conversation with one reply.
///
/// One call is one request/response round trip; no streaming.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

// ============================================================================
// Chat-completions wire types
// ============================================================================

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ============================================================================
// OpenAI-compatible client
// ============================================================================

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Build a client from config, reading the key from `config.api_key_env`.
    ///
    /// A missing key is not fatal here; every call then fails with
    /// [`LlmError::MissingKey`].
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "No language-model API key in environment; requests will fail"
            );
        }
        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingKey)?;

        let request = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "Sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }
}

// ============================================================================
// Mock client
// ============================================================================

type Handler = dyn Fn(&[ChatMessage]) -> Result<String, LlmError> + Send + Sync;

/// Scripted client for tests and offline runs.
///
/// Every request is recorded. Replies come from a handler function; the
/// default handler echoes the last message.
#[derive(Clone)]
pub struct MockCompletionClient {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockCompletionClient {
    /// Echo client: replies `Mock reply to: <last message>`.
    pub fn new() -> Self {
        Self::with_handler(|messages| {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            Ok(format!("Mock reply to: {}", last))
        })
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&[ChatMessage]) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Client whose every call fails with `err`.
    pub fn failing(err: LlmError) -> Self {
        Self::with_handler(move |_| Err(err.clone()))
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        (self.handler)(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use pharmaq_core::types::Role;

    /// Serve `router` on an ephemeral localhost port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str, key: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(
            base_url,
            "gpt-3.5-turbo",
            key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let c = client("https://api.example.com/v1/", Some("k"));
        assert_eq!(c.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let c = client("http://127.0.0.1:9", None);
        let err = c.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert_eq!(err, LlmError::MissingKey);
    }

    #[tokio::test]
    async fn test_blank_key_is_treated_as_missing() {
        let c = client("http://127.0.0.1:9", Some("   "));
        let err = c.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert_eq!(err, LlmError::MissingKey);
    }

    #[tokio::test]
    async fn test_complete_sends_history_and_returns_content() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
                let last_role = body["messages"][count - 1]["role"].clone();
                Json(serde_json::json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": format!("{} messages, last from {}", count, last_role.as_str().unwrap_or("?"))
                        }
                    }]
                }))
            }),
        );
        let base = serve(router).await;
        let c = client(&format!("{}/v1", base), Some("sk-test"));

        let history = vec![
            ChatMessage::user("Hello"),
            ChatMessage::assistant("Hi there"),
            ChatMessage::user("Tell me about ASCO"),
        ];
        let reply = c.complete(&history).await.unwrap();
        assert_eq!(reply, "3 messages, last from user");
    }

    #[tokio::test]
    async fn test_api_error_body_is_surfaced() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
                    })),
                )
            }),
        );
        let base = serve(router).await;
        let err = client(&base, Some("bad"))
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LlmError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(serde_json::json!({ "choices": [] })) }),
        );
        let base = serve(router).await;
        let err = client(&base, Some("k"))
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(&format!("http://{}", addr), Some("k"))
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockCompletionClient::new();
        let reply = mock.complete(&[ChatMessage::user("ping")]).await.unwrap();
        assert_eq!(reply, "Mock reply to: ping");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.requests()[0][0].role, Role::User);
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockCompletionClient::failing(LlmError::Network("down".into()));
        assert!(mock.complete(&[]).await.is_err());
        assert_eq!(mock.call_count(), 1);
    }
}
