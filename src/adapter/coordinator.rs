// src/adapter/coordinator.rs
// Wires configuration, stores and clients into the forecast use case

use std::sync::Arc;

use crate::application::dto::{ForecastRequest, ForecastResponse};
use crate::application::usecase::{ForecastOrchestrator, ForecastUseCase};
use crate::config::Config;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::repository::{CacheStore, RateLimitStore};
use crate::domain::service::ChatCompletionService;
use crate::infrastructure::{HyperChatClient, InMemoryCacheStore, InMemoryRateLimitStore};

pub struct ForecastCoordinator {
    usecase: Arc<dyn ForecastUseCase>,
}

impl ForecastCoordinator {
    pub fn new(usecase: Arc<dyn ForecastUseCase>) -> Self {
        Self { usecase }
    }

    /// In-memory stores plus the hyper chat client when an API key is configured.
    pub fn from_config(config: &Config) -> Self {
        let chat: Option<Arc<dyn ChatCompletionService>> = match HyperChatClient::new(&config.llm) {
            Ok(client) => {
                log::info!("Language model enabled: {} at {}", config.llm.model, config.llm.base_url);
                Some(Arc::new(client))
            }
            Err(e) => {
                log::info!("Language model disabled ({}); using keyword parsing and templates", e);
                None
            }
        };

        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        let rate_limits: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());
        let orchestrator = ForecastOrchestrator::new(cache, rate_limits, chat, config);

        Self::new(Arc::new(orchestrator))
    }

    pub async fn forecast(&self, request: ForecastRequest) -> AppResult<ForecastResponse> {
        self.usecase.forecast(request).await
    }

    /// JSON request in, pretty JSON response out.
    pub async fn handle_json(&self, body: &str) -> AppResult<String> {
        let request: ForecastRequest = serde_json::from_str(body)
            .map_err(|e| AppError::Validation(format!("invalid request JSON: {}", e)))?;
        let response = self.forecast(request).await?;
        Ok(serde_json::to_string_pretty(&response)?)
    }

    pub async fn remaining_requests(&self, user_id: &str) -> AppResult<u32> {
        self.usecase.remaining_requests(user_id).await
    }
}
