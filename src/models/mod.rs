// src/models/mod.rs
// Forecast strategies behind a single fit/predict contract

pub mod linear;
pub mod seasonal;
pub mod selector;

use std::time::Duration;

use crate::domain::errors::{DependencyError, DependencyResult};
use crate::domain::model::{ForecastSeries, ModelKind, TimeSeries};

pub use linear::LinearTrendState;
pub use seasonal::SeasonalState;
pub use selector::{ModelSelection, ModelSelector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Prediction interval coverage, e.g. 0.95
    pub confidence_level: f64,
    /// Upper bound on a seasonal fit/predict run
    pub timeout: Duration,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            timeout: Duration::from_secs(10),
        }
    }
}

/// State of a fitted strategy, ready to forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedModel {
    Seasonal(SeasonalState),
    LinearTrend(LinearTrendState),
}

impl FittedModel {
    pub fn fit(kind: ModelKind, series: &TimeSeries, config: &FitConfig) -> DependencyResult<Self> {
        match kind {
            ModelKind::Seasonal => SeasonalState::fit(series, config.confidence_level, config.timeout)
                .map(FittedModel::Seasonal),
            ModelKind::LinearTrend => Ok(FittedModel::LinearTrend(LinearTrendState::fit(series))),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Seasonal(_) => ModelKind::Seasonal,
            FittedModel::LinearTrend(_) => ModelKind::LinearTrend,
        }
    }

    /// Exactly `periods` points with ordered bounds.
    pub async fn predict(&self, periods: usize) -> DependencyResult<ForecastSeries> {
        match self {
            FittedModel::Seasonal(state) => state.predict(periods).await,
            FittedModel::LinearTrend(state) => Ok(state.predict(periods)),
        }
    }
}

/// Fits `kind` and forecasts; a seasonal failure is retried with the linear trend.
///
/// Returns the forecast plus the seasonal failure, if one was recovered.
pub async fn forecast_with_fallback(
    kind: ModelKind,
    series: &TimeSeries,
    config: &FitConfig,
    periods: usize,
) -> (ForecastSeries, Option<DependencyError>) {
    let attempt = match FittedModel::fit(kind, series, config) {
        Ok(model) => model.predict(periods).await,
        Err(e) => Err(e),
    };

    match attempt {
        Ok(forecast) => (forecast, None),
        Err(error) => {
            log::warn!(
                "{} model failed ({}: {}), using linear trend",
                kind,
                error.kind(),
                error
            );
            (LinearTrendState::fit(series).predict(periods), Some(error))
        }
    }
}
