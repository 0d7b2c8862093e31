// src/domain/model/forecast.rs
// Forecast strategy identifiers and forecast series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two forecasting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Seasonal,
    LinearTrend,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelKind::Seasonal => write!(f, "seasonal"),
            ModelKind::LinearTrend => write!(f, "linear_trend"),
        }
    }
}

/// Caller's requested strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelPreference {
    #[default]
    Auto,
    Seasonal,
    Fallback,
}

impl fmt::Display for ModelPreference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelPreference::Auto => write!(f, "auto"),
            ModelPreference::Seasonal => write!(f, "seasonal"),
            ModelPreference::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub y: f64,
    pub y_lower: f64,
    pub y_upper: f64,
}

impl ForecastPoint {
    /// Orders the bounds around `y` so that `y_lower <= y <= y_upper`.
    pub fn bounded(timestamp: NaiveDate, y: f64, a: f64, b: f64) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            timestamp,
            y,
            y_lower: lo.min(y),
            y_upper: hi.max(y),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            timestamp: self.timestamp,
            y: self.y * factor,
            y_lower: self.y_lower * factor,
            y_upper: self.y_upper * factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub model: ModelKind,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(model: ModelKind, points: Vec<ForecastPoint>) -> Self {
        Self { model, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn lower(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y_lower).collect()
    }

    pub fn upper(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y_upper).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn is_well_ordered(&self) -> bool {
        self.points
            .iter()
            .all(|p| p.y_lower <= p.y && p.y <= p.y_upper)
    }
}
