// src/models/selector.rs
// Strategy choice from data volume, seasonality and quality

use crate::domain::model::{DataQualityReport, ModelKind, ModelPreference};

pub const MIN_MODEL_POINTS: usize = 6;
pub const MIN_SEASONAL_POINTS: usize = 12;
pub const SEASONAL_QUALITY_SCORE: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    pub kind: ModelKind,
    pub reason: String,
}

impl ModelSelection {
    fn new(kind: ModelKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSelector {
    pub seasonal_enabled: bool,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            seasonal_enabled: true,
        }
    }
}

impl ModelSelector {
    pub fn new(seasonal_enabled: bool) -> Self {
        Self { seasonal_enabled }
    }

    pub fn select(
        &self,
        preference: ModelPreference,
        data_points: usize,
        quality: Option<&DataQualityReport>,
    ) -> ModelSelection {
        let selection = self.evaluate(preference, data_points, quality);
        log::debug!(
            "Selected {} for {} points ({}): {}",
            selection.kind,
            data_points,
            preference,
            selection.reason
        );
        selection
    }

    fn evaluate(
        &self,
        preference: ModelPreference,
        n: usize,
        quality: Option<&DataQualityReport>,
    ) -> ModelSelection {
        if n < MIN_MODEL_POINTS {
            let reason = match preference {
                ModelPreference::Auto => format!(
                    "only {} data points; linear trend needs the least data",
                    n
                ),
                forced => {
                    log::info!(
                        "Requested {} model downgraded: only {} data points (< {})",
                        forced,
                        n,
                        MIN_MODEL_POINTS
                    );
                    format!(
                        "requested {} but only {} data points; downgraded to linear trend",
                        forced, n
                    )
                }
            };
            return ModelSelection::new(ModelKind::LinearTrend, reason);
        }

        match preference {
            ModelPreference::Fallback => {
                ModelSelection::new(ModelKind::LinearTrend, "linear trend requested")
            }
            ModelPreference::Seasonal if !self.seasonal_enabled => {
                log::info!("Requested seasonal model downgraded: seasonal backend disabled");
                ModelSelection::new(
                    ModelKind::LinearTrend,
                    "requested seasonal but the seasonal backend is disabled; downgraded to linear trend",
                )
            }
            ModelPreference::Seasonal => {
                ModelSelection::new(ModelKind::Seasonal, "seasonal model requested")
            }
            ModelPreference::Auto => self.auto(n, quality),
        }
    }

    fn auto(&self, n: usize, quality: Option<&DataQualityReport>) -> ModelSelection {
        let candidate = match quality {
            Some(report) if report.seasonality.has_seasonality && n >= MIN_SEASONAL_POINTS => {
                Some(format!(
                    "seasonality detected (lag {}) with {} data points",
                    report.seasonality.period.unwrap_or_default(),
                    n
                ))
            }
            Some(report) if report.score() >= SEASONAL_QUALITY_SCORE && n >= MIN_SEASONAL_POINTS => {
                Some(format!(
                    "data quality score {:.0} with {} data points",
                    report.score(),
                    n
                ))
            }
            _ => None,
        };

        match candidate {
            Some(reason) if self.seasonal_enabled => ModelSelection::new(ModelKind::Seasonal, reason),
            Some(reason) => ModelSelection::new(
                ModelKind::LinearTrend,
                format!("{}, but the seasonal backend is disabled", reason),
            ),
            None => ModelSelection::new(
                ModelKind::LinearTrend,
                format!("{} data points without strong seasonal or quality signal", n),
            ),
        }
    }
}
