// src/domain/model/validation.rs
// Holdout metrics and confidence score

use serde::{Deserialize, Serialize};
use std::fmt;

/// `None` marks a metric that is undefined for the held-out data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Percent; `None` when every held-out actual is zero (unbounded)
    pub mape: Option<f64>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    /// `None` when the held-out actuals have zero variance
    pub r_squared: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub data_quantity: f64,
    pub data_quality: f64,
    pub validation_accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceRating {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ConfidenceRating::High
        } else if score >= 60.0 {
            ConfidenceRating::Medium
        } else if score >= 40.0 {
            ConfidenceRating::Low
        } else {
            ConfidenceRating::VeryLow
        }
    }
}

impl fmt::Display for ConfidenceRating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfidenceRating::High => write!(f, "high"),
            ConfidenceRating::Medium => write!(f, "medium"),
            ConfidenceRating::Low => write!(f, "low"),
            ConfidenceRating::VeryLow => write!(f, "very low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub overall_score: f64,
    pub rating: ConfidenceRating,
    pub factors: ConfidenceFactors,
    pub recommendations: Vec<String>,
}
