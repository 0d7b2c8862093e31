// src/application/usecase/forecast_usecase.rs
// Forecast orchestration: rate limit, cache, analysis, modelling, scenario and scoring

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::analysis::{statistics, DataQualityAnalyzer, ValidationEngine};
use crate::application::dto::parser::prepare_series;
use crate::application::dto::{
    ForecastBlock, ForecastRequest, ForecastResponse, ResponseMetadata, ValidationBlock,
};
use crate::application::service::{ExplanationContext, ExplanationService, ExplanationServiceImpl};
use crate::config::Config;
use crate::domain::errors::{AppError, AppResult, DependencyError, DependencyResult};
use crate::domain::model::{ModelKind, TimeSeries, ValidationMetrics};
use crate::domain::repository::{CacheStore, RateLimitStore};
use crate::domain::service::ChatCompletionService;
use crate::models::{forecast_with_fallback, FitConfig, FittedModel, ModelSelector};
use crate::scenario::{apply_scenario, ScenarioInterpreter};

#[async_trait]
pub trait ForecastUseCase: Send + Sync {
    /// Runs the full pipeline for one request.
    async fn forecast(&self, request: ForecastRequest) -> AppResult<ForecastResponse>;

    /// Requests `user_id` may still make in the current window.
    async fn remaining_requests(&self, user_id: &str) -> AppResult<u32>;
}

/// Limits and lifetimes the orchestrator enforces.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub model_timeout: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            rate_limit: config.rate_limit.requests_per_window,
            rate_limit_window: config.rate_limit.window(),
            cache_enabled: config.cache.enabled,
            cache_ttl: config.cache.ttl(),
            model_timeout: config.forecast.model_timeout(),
        }
    }
}

pub struct ForecastOrchestrator {
    cache: Arc<dyn CacheStore>,
    rate_limits: Arc<dyn RateLimitStore>,
    interpreter: ScenarioInterpreter,
    explainer: Arc<dyn ExplanationService>,
    analyzer: DataQualityAnalyzer,
    selector: ModelSelector,
    validator: ValidationEngine,
    settings: OrchestratorSettings,
}

impl ForecastOrchestrator {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        rate_limits: Arc<dyn RateLimitStore>,
        chat: Option<Arc<dyn ChatCompletionService>>,
        config: &Config,
    ) -> Self {
        let explanation_chat = if config.llm.explanations {
            chat.clone()
        } else {
            None
        };

        Self {
            cache,
            rate_limits,
            interpreter: ScenarioInterpreter::new(chat, config.llm.timeout()),
            explainer: Arc::new(ExplanationServiceImpl::new(
                explanation_chat,
                config.llm.timeout(),
            )),
            analyzer: DataQualityAnalyzer::new(
                config.forecast.iqr_multiplier,
                config.forecast.z_threshold,
            ),
            selector: ModelSelector::new(config.forecast.seasonal_enabled),
            validator: ValidationEngine::new(),
            settings: OrchestratorSettings::from_config(config),
        }
    }

    /// Replaces the explanation service.
    pub fn with_explainer(mut self, explainer: Arc<dyn ExplanationService>) -> Self {
        self.explainer = explainer;
        self
    }

    async fn check_rate_limit(&self, user_id: &str) -> AppResult<()> {
        let key = rate_limit_key(user_id);
        match self
            .rate_limits
            .increment_with_expiry(&key, self.settings.rate_limit_window)
            .await
        {
            Ok(count) if count > u64::from(self.settings.rate_limit) => {
                log::info!("Rate limit exceeded for user {} ({} requests)", user_id, count);
                Err(AppError::RateLimit {
                    user_id: user_id.to_string(),
                    limit: self.settings.rate_limit,
                })
            }
            Ok(_) => Ok(()),
            Err(e) => {
                // fail open when the counter store is down
                log::warn!("[user {}] rate limit store unavailable: {}", user_id, e);
                Ok(())
            }
        }
    }

    async fn cached_response(&self, key: &str, user_id: &str) -> Option<ForecastResponse> {
        if !self.settings.cache_enabled {
            return None;
        }
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<ForecastResponse>(&raw) {
                Ok(mut response) => {
                    log::info!("[user {}] cache hit {}", user_id, key_prefix(key));
                    response.metadata.cached = true;
                    Some(response)
                }
                Err(e) => {
                    log::warn!("[user {}] unreadable cache entry {}: {}", user_id, key_prefix(key), e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("[user {}] cache lookup failed for {}: {}", user_id, key_prefix(key), e);
                None
            }
        }
    }

    /// Writes on a detached task so the entry lands even if the caller goes away.
    fn store_response(&self, key: String, response: &ForecastResponse, user_id: &str) {
        if !self.settings.cache_enabled {
            return;
        }
        let payload = match serde_json::to_string(response) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("[user {}] response not cacheable: {}", user_id, e);
                return;
            }
        };
        let cache = Arc::clone(&self.cache);
        let ttl = self.settings.cache_ttl;
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = cache.set_with_ttl(&key, payload, ttl).await {
                log::warn!("[user {}] cache write failed for {}: {}", user_id, key_prefix(&key), e);
            }
        });
    }

    /// Scores the selected strategy on a temporal holdout.
    ///
    /// `Ok(None)` when the series is too short for a split.
    async fn holdout_metrics(
        &self,
        series: &TimeSeries,
        kind: ModelKind,
        fit_config: &FitConfig,
    ) -> DependencyResult<Option<ValidationMetrics>> {
        let Some(split) = self.validator.holdout_split(series.len()) else {
            return Ok(None);
        };
        let (train, test) = series.split_at(split);
        let predicted = FittedModel::fit(kind, &train, fit_config)?
            .predict(test.len())
            .await?;
        if predicted.len() != test.len() {
            return Err(DependencyError::ModelFit(format!(
                "holdout produced {} of {} points",
                predicted.len(),
                test.len()
            )));
        }
        Ok(Some(
            self.validator
                .compute_metrics(&test.values(), &predicted.values()),
        ))
    }
}

#[async_trait]
impl ForecastUseCase for ForecastOrchestrator {
    async fn forecast(&self, request: ForecastRequest) -> AppResult<ForecastResponse> {
        let user_id = request.user_id.clone();

        self.check_rate_limit(&user_id).await?;
        request.validate()?;

        let key = cache_key(&request);
        if let Some(response) = self.cached_response(&key, &user_id).await {
            return Ok(response);
        }
        log::info!(
            "[user {}] forecasting '{}' ({} rows, {} periods, key {})",
            user_id,
            request.target_column,
            request.rows.len(),
            request.periods_ahead,
            key_prefix(&key)
        );

        let date_column = request.date_column.as_deref();
        let quality = self
            .analyzer
            .analyze(&request.rows, &request.target_column, date_column)
            .map_err(|e| {
                log::warn!("[user {}] quality stage rejected input: {}", user_id, e);
                AppError::from(e)
            })?;
        if quality.has_zero_variance() {
            return Err(AppError::Validation(format!(
                "target column '{}' has zero variance; nothing to forecast",
                request.target_column
            )));
        }

        let series = prepare_series(&request.rows, &request.target_column, date_column)?;
        let values = series.values();
        // averaging duplicate timestamps can flatten a varying column
        if statistics::std_dev(&values) <= f64::EPSILON {
            return Err(AppError::Validation(format!(
                "target column '{}' has zero variance after merging duplicate timestamps",
                request.target_column
            )));
        }
        let last_observed = values.last().copied().unwrap_or_default();

        let mut degradations = Vec::new();

        let scenario = self
            .interpreter
            .interpret(&request.scenario_text, &request.columns())
            .await;
        if let Some(reason) = &scenario.fallback_reason {
            degradations.push(format!("scenario: {}", reason));
        }

        let selection = self
            .selector
            .select(request.model_preference, series.len(), Some(&quality));

        let fit_config = FitConfig {
            confidence_level: request.confidence_level,
            timeout: self.settings.model_timeout,
        };

        let metrics = match self
            .holdout_metrics(&series, selection.kind, &fit_config)
            .await
        {
            Ok(metrics) => metrics,
            Err(e) => {
                log::warn!("[user {}] {} holdout failed, metrics skipped: {}", user_id, selection.kind, e);
                degradations.push(format!("holdout: {}", e));
                None
            }
        };

        let periods = request.periods_ahead as usize;
        let (raw_forecast, model_failure) =
            forecast_with_fallback(selection.kind, &series, &fit_config, periods).await;
        if let Some(e) = &model_failure {
            log::warn!("[user {}] {} model failed, served linear trend: {}", user_id, selection.kind, e);
            degradations.push(format!("model: {}", e));
        }

        let forecast = apply_scenario(&raw_forecast, &scenario.params);
        let confidence = self
            .validator
            .confidence_score(series.len(), &values, metrics.as_ref());

        let explanation = self
            .explainer
            .explain(&ExplanationContext {
                target: &request.target_column,
                forecast: &forecast,
                last_observed,
                scenario: &scenario,
                quality: &quality,
                confidence: &confidence,
            })
            .await;
        if let Some(e) = &explanation.failure {
            degradations.push(format!("explanation: {}", e));
        }

        let response = ForecastResponse {
            forecast: ForecastBlock {
                values: forecast.values(),
                lower: forecast.lower(),
                upper: forecast.upper(),
                timestamps: forecast.timestamps(),
                model_used: forecast.model,
                confidence_level: request.confidence_level,
            },
            explanation: explanation.text,
            scenario_parsed: scenario.params.clone(),
            validation: ValidationBlock {
                metrics,
                confidence_score: confidence,
                data_quality_rating: quality.overall_quality.rating,
            },
            metadata: ResponseMetadata {
                model_used: forecast.model,
                data_points: series.len(),
                forecast_periods: request.periods_ahead,
                generated_at: chrono::Utc::now(),
                scenario_source: scenario.source,
                selection_reason: selection.reason,
                cached: false,
                degradations,
            },
        };

        self.store_response(key, &response, &user_id);
        log::info!(
            "[user {}] forecast ready: {} points via {}",
            user_id,
            response.forecast.values.len(),
            response.metadata.model_used
        );
        Ok(response)
    }

    async fn remaining_requests(&self, user_id: &str) -> AppResult<u32> {
        let used = self.rate_limits.current(&rate_limit_key(user_id)).await?;
        let remaining = u64::from(self.settings.rate_limit).saturating_sub(used);
        Ok(u32::try_from(remaining).unwrap_or(self.settings.rate_limit))
    }
}

fn rate_limit_key(user_id: &str) -> String {
    format!("ratelimit:{}", user_id)
}

fn key_prefix(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

/// SHA-256 over a canonical JSON rendering of every request field.
///
/// Row objects serialize with sorted keys, so column order does not matter.
pub fn cache_key(request: &ForecastRequest) -> String {
    let normalized = json!([
        request.rows,
        request.scenario_text.trim(),
        request.target_column,
        request.date_column,
        request.model_preference,
        request.periods_ahead,
        request.confidence_level,
        request.user_id,
    ]);
    let digest = Sha256::digest(normalized.to_string().as_bytes());
    hex::encode(digest)
}
