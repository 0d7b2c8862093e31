// src/application/dto/mod.rs
// Request and response shapes of the forecast use case

pub mod parser;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Row;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::model::{
    ConfidenceScore, ModelKind, ModelPreference, QualityRating, ScenarioParams, ScenarioSource,
    ValidationMetrics,
};

pub const MAX_SCENARIO_CHARS: usize = 500;
pub const MAX_PERIODS_AHEAD: u32 = 120;
pub const MIN_CONFIDENCE_LEVEL: f64 = 0.5;
pub const MAX_CONFIDENCE_LEVEL: f64 = 0.99;

fn default_periods_ahead() -> u32 {
    12
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub rows: Vec<Row>,
    #[serde(default)]
    pub scenario_text: String,
    pub target_column: String,
    #[serde(default)]
    pub date_column: Option<String>,
    #[serde(default)]
    pub model_preference: ModelPreference,
    #[serde(default = "default_periods_ahead")]
    pub periods_ahead: u32,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl ForecastRequest {
    pub fn new(rows: Vec<Row>, target_column: impl Into<String>) -> Self {
        Self {
            rows,
            scenario_text: String::new(),
            target_column: target_column.into(),
            date_column: None,
            model_preference: ModelPreference::Auto,
            periods_ahead: default_periods_ahead(),
            confidence_level: default_confidence_level(),
            user_id: default_user_id(),
        }
    }

    /// Field-level checks that need no data analysis.
    pub fn validate(&self) -> AppResult<()> {
        if self.rows.is_empty() {
            return Err(AppError::Validation("dataset has no rows".to_string()));
        }
        if self.target_column.trim().is_empty() {
            return Err(AppError::Validation("target_column is required".to_string()));
        }
        if self.user_id.trim().is_empty() {
            return Err(AppError::Validation("user_id is required".to_string()));
        }
        let scenario_chars = self.scenario_text.chars().count();
        if scenario_chars > MAX_SCENARIO_CHARS {
            return Err(AppError::Validation(format!(
                "scenario_text is {} characters; maximum is {}",
                scenario_chars, MAX_SCENARIO_CHARS
            )));
        }
        if !(1..=MAX_PERIODS_AHEAD).contains(&self.periods_ahead) {
            return Err(AppError::Validation(format!(
                "periods_ahead must be between 1 and {}, got {}",
                MAX_PERIODS_AHEAD, self.periods_ahead
            )));
        }
        if !(MIN_CONFIDENCE_LEVEL..=MAX_CONFIDENCE_LEVEL).contains(&self.confidence_level) {
            return Err(AppError::Validation(format!(
                "confidence_level must be between {} and {}, got {}",
                MIN_CONFIDENCE_LEVEL, MAX_CONFIDENCE_LEVEL, self.confidence_level
            )));
        }
        Ok(())
    }

    /// Column names present in any row, sorted.
    pub fn columns(&self) -> Vec<String> {
        let names: std::collections::BTreeSet<&String> =
            self.rows.iter().flat_map(|row| row.keys()).collect();
        names.into_iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBlock {
    pub values: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub timestamps: Vec<NaiveDate>,
    pub model_used: ModelKind,
    pub confidence_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationBlock {
    /// `None` when no holdout could be run
    pub metrics: Option<ValidationMetrics>,
    pub confidence_score: ConfidenceScore,
    pub data_quality_rating: QualityRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub model_used: ModelKind,
    pub data_points: usize,
    pub forecast_periods: u32,
    pub generated_at: DateTime<Utc>,
    pub scenario_source: ScenarioSource,
    pub selection_reason: String,
    pub cached: bool,
    /// Stages that fell back to a degraded path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast: ForecastBlock,
    pub explanation: String,
    pub scenario_parsed: ScenarioParams,
    pub validation: ValidationBlock,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> ForecastRequest {
        let mut row = Row::new();
        row.insert("sales".into(), json!(1));
        ForecastRequest::new(vec![row], "sales")
    }

    #[test]
    fn defaults_from_json() {
        let req: ForecastRequest =
            serde_json::from_value(json!({"rows": [{"sales": 1}], "target_column": "sales"})).unwrap();
        assert_eq!(req.periods_ahead, 12);
        assert_eq!(req.model_preference, ModelPreference::Auto);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut req = request();
        req.periods_ahead = 0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.confidence_level = 0.999;
        assert!(req.validate().is_err());

        let mut req = request();
        req.scenario_text = "x".repeat(MAX_SCENARIO_CHARS + 1);
        assert!(req.validate().is_err());
    }
}
