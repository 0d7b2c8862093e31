// src/domain/service/mod.rs
// Domain service interfaces

use async_trait::async_trait;

use crate::domain::errors::DependencyError;

/// Single-turn prompt sent to a chat-completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Returns the raw text content of the first completion choice.
    ///
    /// The text is not guaranteed to be JSON even when the prompt asks for it.
    async fn complete(&self, request: &ChatRequest) -> Result<String, DependencyError>;
}
