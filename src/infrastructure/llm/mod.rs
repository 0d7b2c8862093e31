// src/infrastructure/llm/mod.rs
// OpenAI-compatible chat-completion client over hyper, with retry and backoff

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use hyper::{client::HttpConnector, Body, Client, Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::domain::errors::{DependencyError, DependencyResult};
use crate::domain::service::{ChatCompletionService, ChatRequest};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct HyperChatClient {
    client: Client<HttpsConnector<HttpConnector>>,
    endpoint: String,
    api_key: String,
    model: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl HyperChatClient {
    pub fn new(config: &LlmConfig) -> DependencyResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DependencyError::NotConfigured("LLM_API_KEY is not set".to_string()))?;

        let https = HttpsConnector::new();
        let client = Client::builder().build::<_, Body>(https);

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    async fn send_once(&self, request: &ChatRequest) -> DependencyResult<String> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        let payload = serde_json::to_vec(&body)
            .map_err(|e| DependencyError::MalformedResponse(format!("request encoding: {}", e)))?;

        let http_request = Request::builder()
            .method(Method::POST)
            .uri(&self.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .body(Body::from(payload))
            .map_err(|e| DependencyError::NotConfigured(format!("invalid LLM endpoint: {}", e)))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| DependencyError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| DependencyError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DependencyError::Authentication(status.as_u16()));
        }
        if !status.is_success() {
            return Err(DependencyError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).chars().take(200).collect(),
            });
        }

        extract_content(&bytes)
    }
}

/// Content of the first choice in a chat-completion response body.
pub fn extract_content(body: &[u8]) -> DependencyResult<String> {
    let parsed: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| DependencyError::MalformedResponse(format!("completion body: {}", e)))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| DependencyError::MalformedResponse("completion has no content".to_string()))
}

#[async_trait]
impl ChatCompletionService for HyperChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, DependencyError> {
        retry_with_backoff(self.max_attempts, self.base_delay, || self.send_once(request)).await
    }
}

/// Runs `operation` up to `max_attempts` times, doubling the delay after each
/// transient failure. Non-transient errors return immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> DependencyResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DependencyResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < max_attempts => {
                let delay = base_delay * 2u32.saturating_pow(attempt - 1);
                log::warn!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt,
                    max_attempts,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
