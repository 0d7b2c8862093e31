// src/scenario/interpreter.rs
// Free-text scenario to structured parameters via a language model, with keyword fallback

use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{DependencyError, DependencyResult};
use crate::domain::model::{ParsedScenario, ScenarioParams, ScenarioSource};
use crate::domain::service::{ChatCompletionService, ChatRequest};
use crate::scenario::keywords::parse_scenario_keywords;

const SCENARIO_MAX_TOKENS: u32 = 300;
const SCENARIO_TEMPERATURE: f32 = 0.1;

pub struct ScenarioInterpreter {
    chat: Option<Arc<dyn ChatCompletionService>>,
    timeout: Duration,
}

impl ScenarioInterpreter {
    pub fn new(chat: Option<Arc<dyn ChatCompletionService>>, timeout: Duration) -> Self {
        Self { chat, timeout }
    }

    /// Interpreter that always uses the keyword parser.
    pub fn offline() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    /// Never fails: any language-model problem routes to the keyword parser.
    pub async fn interpret(&self, text: &str, columns: &[String]) -> ParsedScenario {
        let text = text.trim();
        if text.is_empty() {
            return ParsedScenario {
                params: ScenarioParams::default(),
                source: ScenarioSource::Empty,
                fallback_reason: None,
            };
        }

        match self.ask_language_model(text, columns).await {
            Ok(params) => ParsedScenario {
                params,
                source: ScenarioSource::LanguageModel,
                fallback_reason: None,
            },
            Err(error) => {
                match &error {
                    DependencyError::NotConfigured(_) => {
                        log::debug!("Scenario parsed with keywords: {}", error)
                    }
                    _ => log::warn!(
                        "Scenario interpretation fell back to keywords ({}): {}",
                        error.kind(),
                        error
                    ),
                }
                ParsedScenario {
                    params: parse_scenario_keywords(text),
                    source: ScenarioSource::KeywordFallback,
                    fallback_reason: Some(error.to_string()),
                }
            }
        }
    }

    async fn ask_language_model(&self, text: &str, columns: &[String]) -> DependencyResult<ScenarioParams> {
        let chat = self
            .chat
            .as_ref()
            .ok_or_else(|| DependencyError::NotConfigured("no language model client".to_string()))?;

        let request = ChatRequest::new(
            build_scenario_prompt(text, columns),
            SCENARIO_MAX_TOKENS,
            SCENARIO_TEMPERATURE,
        );
        let raw = tokio::time::timeout(self.timeout, chat.complete(&request))
            .await
            .map_err(|_| DependencyError::Timeout(self.timeout))??;

        parse_llm_response(&raw)
    }
}

pub fn build_scenario_prompt(text: &str, columns: &[String]) -> String {
    format!(
        "You convert business scenarios into forecast adjustments.\n\
         Available data columns: {columns}\n\
         Scenario: \"{text}\"\n\n\
         Respond with ONLY a JSON object, no prose, with these fields:\n\
         {{\"multiplier\": number >= 0 (1.0 = no change, 1.1 = +10%, 0.9 = -10%),\n\
         \"start_period\": integer >= 0 (forecast period where the change begins),\n\
         \"ramp_periods\": integer >= 0 (periods to phase the change in, 0 = immediate),\n\
         \"time_horizon\": \"short_term\" | \"medium_term\" | \"long_term\",\n\
         \"confidence\": \"high\" | \"medium\" | \"low\"}}",
        columns = if columns.is_empty() {
            "(none)".to_string()
        } else {
            columns.join(", ")
        },
        text = text.replace('"', "'"),
    )
}

/// Removes a surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses and validates the model's JSON reply.
pub fn parse_llm_response(raw: &str) -> DependencyResult<ScenarioParams> {
    let body = strip_code_fences(raw);
    // tolerate prose around the object
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(DependencyError::MalformedResponse(
                "no JSON object in response".to_string(),
            ))
        }
    };

    let params: ScenarioParams = serde_json::from_str(json)
        .map_err(|e| DependencyError::MalformedResponse(format!("invalid scenario JSON: {}", e)))?;
    params.validate().map_err(DependencyError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ScenarioConfidence, TimeHorizon};

    #[test]
    fn strips_fences_with_language_tag() {
        let raw = "```json\n{\"multiplier\": 1.2}\n```";
        assert_eq!(strip_code_fences(raw), "{\"multiplier\": 1.2}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn parses_full_reply() {
        let raw = r#"{"multiplier": 1.15, "start_period": 2, "ramp_periods": 1,
                      "time_horizon": "long_term", "confidence": "high"}"#;
        let params = parse_llm_response(raw).unwrap();
        assert_eq!(params.start_period, 2);
        assert_eq!(params.time_horizon, TimeHorizon::LongTerm);
        assert_eq!(params.confidence, ScenarioConfidence::High);
    }

    #[test]
    fn rejects_negative_multiplier() {
        let raw = r#"{"multiplier": -1.0, "start_period": 0, "ramp_periods": 0}"#;
        assert!(matches!(
            parse_llm_response(raw),
            Err(DependencyError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rejects_prose() {
        assert!(parse_llm_response("I think sales go up").is_err());
    }
}
