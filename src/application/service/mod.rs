// src/application/service/mod.rs
// Application services

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::{DependencyError, DependencyResult};
use crate::domain::model::{
    ConfidenceScore, DataQualityReport, ForecastSeries, ParsedScenario, ScenarioSource,
};
use crate::domain::service::{ChatCompletionService, ChatRequest};

const EXPLANATION_MAX_TOKENS: u32 = 400;
const EXPLANATION_TEMPERATURE: f32 = 0.3;

/// Everything an explanation may refer to.
#[derive(Debug, Clone, Copy)]
pub struct ExplanationContext<'a> {
    pub target: &'a str,
    pub forecast: &'a ForecastSeries,
    /// Last observed value of the target
    pub last_observed: f64,
    pub scenario: &'a ParsedScenario,
    pub quality: &'a DataQualityReport,
    pub confidence: &'a ConfidenceScore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub text: String,
    /// Set when the language model was configured but failed
    pub failure: Option<DependencyError>,
}

#[async_trait]
pub trait ExplanationService: Send + Sync {
    /// Never fails; a template is used when the language model is unavailable.
    async fn explain(&self, context: &ExplanationContext<'_>) -> Explanation;
}

pub struct ExplanationServiceImpl {
    chat: Option<Arc<dyn ChatCompletionService>>,
    timeout: Duration,
}

impl ExplanationServiceImpl {
    pub fn new(chat: Option<Arc<dyn ChatCompletionService>>, timeout: Duration) -> Self {
        Self { chat, timeout }
    }

    async fn ask_language_model(
        &self,
        chat: &Arc<dyn ChatCompletionService>,
        context: &ExplanationContext<'_>,
    ) -> DependencyResult<String> {
        let request = ChatRequest::new(
            build_explanation_prompt(context),
            EXPLANATION_MAX_TOKENS,
            EXPLANATION_TEMPERATURE,
        );
        let text = tokio::time::timeout(self.timeout, chat.complete(&request))
            .await
            .map_err(|_| DependencyError::Timeout(self.timeout))??;
        let text = text.trim();
        if text.is_empty() {
            return Err(DependencyError::MalformedResponse("empty explanation".to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl ExplanationService for ExplanationServiceImpl {
    async fn explain(&self, context: &ExplanationContext<'_>) -> Explanation {
        let Some(chat) = &self.chat else {
            return Explanation {
                text: template_explanation(context),
                failure: None,
            };
        };

        match self.ask_language_model(chat, context).await {
            Ok(text) => Explanation {
                text,
                failure: None,
            },
            Err(error) => {
                log::warn!("Explanation fell back to template ({}): {}", error.kind(), error);
                Explanation {
                    text: template_explanation(context),
                    failure: Some(error),
                }
            }
        }
    }
}

struct ForecastSummary {
    start: f64,
    end: f64,
    change_percent: Option<f64>,
}

fn summarize(context: &ExplanationContext<'_>) -> ForecastSummary {
    let values = context.forecast.values();
    let start = values.first().copied().unwrap_or(f64::NAN);
    let end = values.last().copied().unwrap_or(f64::NAN);
    let change_percent = if context.last_observed.abs() > f64::EPSILON && end.is_finite() {
        Some((end - context.last_observed) / context.last_observed.abs() * 100.0)
    } else {
        None
    };
    ForecastSummary {
        start,
        end,
        change_percent,
    }
}

fn scenario_effect(scenario: &ParsedScenario) -> String {
    let params = &scenario.params;
    if params.is_neutral() {
        return match scenario.source {
            ScenarioSource::Empty => "No scenario adjustment was requested.".to_string(),
            _ => "The scenario did not translate into a numeric adjustment.".to_string(),
        };
    }

    let mut effect = format!(
        "The scenario applies a {:+.1}% adjustment starting at forecast period {}",
        params.percent_change(),
        params.start_period + 1
    );
    if params.ramp_periods > 0 {
        effect.push_str(&format!(", phased in over {} periods", params.ramp_periods));
    }
    effect.push('.');
    effect
}

/// Deterministic explanation built from the forecast summary.
pub fn template_explanation(context: &ExplanationContext<'_>) -> String {
    let summary = summarize(context);
    let periods = context.forecast.len();

    let mut parts = vec![format!(
        "Forecast of '{}' for the next {} period{} using the {} model.",
        context.target,
        periods,
        if periods == 1 { "" } else { "s" },
        context.forecast.model
    )];

    let movement = match summary.change_percent {
        Some(change) => format!(
            "Values move from {:.2} to {:.2}, {:+.1}% against the last observed {:.2}.",
            summary.start, summary.end, change, context.last_observed
        ),
        None => format!("Values move from {:.2} to {:.2}.", summary.start, summary.end),
    };
    parts.push(movement);
    parts.push(scenario_effect(context.scenario));
    parts.push(format!(
        "Data quality is {} ({:.0}/100) and forecast confidence is {} ({:.0}/100).",
        context.quality.overall_quality.rating,
        context.quality.score(),
        context.confidence.rating,
        context.confidence.overall_score
    ));
    if let Some(first) = context.confidence.recommendations.first() {
        parts.push(format!("{}.", first.trim_end_matches('.')));
    }

    parts.join(" ")
}

pub fn build_explanation_prompt(context: &ExplanationContext<'_>) -> String {
    let summary = summarize(context);
    format!(
        "Explain this forecast to a business user in 3-4 plain sentences. Do not use markdown.\n\
         Target: {target}\n\
         Model: {model}\n\
         Periods: {periods}\n\
         Last observed value: {last:.2}\n\
         Forecast start: {start:.2}, end: {end:.2}\n\
         Data quality: {quality} ({quality_score:.0}/100)\n\
         Confidence: {confidence} ({confidence_score:.0}/100)\n\
         Scenario: {scenario}",
        target = context.target,
        model = context.forecast.model,
        periods = context.forecast.len(),
        last = context.last_observed,
        start = summary.start,
        end = summary.end,
        quality = context.quality.overall_quality.rating,
        quality_score = context.quality.score(),
        confidence = context.confidence.rating,
        confidence_score = context.confidence.overall_score,
        scenario = scenario_effect(context.scenario),
    )
}
