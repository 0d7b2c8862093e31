// src/domain/model/scenario.rs
// Structured scenario adjustment parameters

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioConfidence {
    High,
    Medium,
    #[default]
    Low,
}

/// Multiplier 1.0 means no change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub multiplier: f64,
    pub start_period: u32,
    pub ramp_periods: u32,
    #[serde(default)]
    pub time_horizon: TimeHorizon,
    #[serde(default)]
    pub confidence: ScenarioConfidence,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            start_period: 0,
            ramp_periods: 0,
            time_horizon: TimeHorizon::MediumTerm,
            confidence: ScenarioConfidence::Low,
        }
    }
}

impl ScenarioParams {
    pub fn validate(self) -> Result<Self, String> {
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(format!(
                "multiplier must be a finite non-negative number, got {}",
                self.multiplier
            ));
        }
        Ok(self)
    }

    pub fn is_neutral(&self) -> bool {
        (self.multiplier - 1.0).abs() < f64::EPSILON
    }

    /// Signed percentage change implied by the multiplier.
    pub fn percent_change(&self) -> f64 {
        (self.multiplier - 1.0) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSource {
    /// No scenario text was supplied
    Empty,
    LanguageModel,
    KeywordFallback,
}

impl fmt::Display for ScenarioSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScenarioSource::Empty => write!(f, "empty"),
            ScenarioSource::LanguageModel => write!(f, "language_model"),
            ScenarioSource::KeywordFallback => write!(f, "keyword_fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedScenario {
    pub params: ScenarioParams,
    pub source: ScenarioSource,
    /// Why the language-model path was not used, when it was not
    pub fallback_reason: Option<String>,
}
