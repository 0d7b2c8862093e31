// src/models/seasonal.rs
// Seasonal/trend model backed by augurs (MSTL with an AutoETS trend, or plain AutoETS)

use std::time::Duration;

use augurs::{
    ets::AutoETS,
    forecaster::{transforms::LinearInterpolator, Forecaster},
    mstl::MSTLModel,
};
use chrono::NaiveDate;

use crate::domain::errors::{DependencyError, DependencyResult};
use crate::domain::model::{Frequency, ForecastPoint, ForecastSeries, ModelKind, TimeSeries};
use crate::models::linear::BAND_FRACTION;

/// Minimum observations for MSTL decomposition.
pub const MIN_MSTL_POINTS: usize = 24;
/// Minimum observations augurs needs to fit anything.
const MIN_ETS_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalStrategy {
    Mstl { period: usize },
    Ets,
}

/// Observed data and settings for the augurs forecaster.
///
/// augurs fits and predicts in one blocking call inside [`SeasonalState::predict`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalState {
    values: Vec<f64>,
    strategy: SeasonalStrategy,
    origin: NaiveDate,
    frequency: Frequency,
    confidence_level: f64,
    timeout: Duration,
}

impl SeasonalState {
    pub fn fit(series: &TimeSeries, confidence_level: f64, timeout: Duration) -> DependencyResult<Self> {
        let values = series.values();
        if values.len() < MIN_ETS_POINTS {
            return Err(DependencyError::ModelFit(format!(
                "need at least {} observations, got {}",
                MIN_ETS_POINTS,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DependencyError::ModelFit("series contains non-finite values".to_string()));
        }

        let frequency = series.frequency();
        let strategy = choose_strategy(values.len(), frequency.seasonal_period());
        let origin = match series.last() {
            Some(point) => point.timestamp,
            None => return Err(DependencyError::ModelFit("empty series".to_string())),
        };

        log::debug!(
            "Seasonal model: {:?} over {} observations ({:?})",
            strategy,
            values.len(),
            frequency
        );

        Ok(Self {
            values,
            strategy,
            origin,
            frequency,
            confidence_level,
            timeout,
        })
    }

    pub fn strategy(&self) -> SeasonalStrategy {
        self.strategy
    }

    pub async fn predict(&self, periods: usize) -> DependencyResult<ForecastSeries> {
        let values = self.values.clone();
        let strategy = self.strategy;
        let level = self.confidence_level;

        let task = tokio::task::spawn_blocking(move || run_forecaster(&values, strategy, periods, level));
        let forecast = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => return Err(DependencyError::Timeout(self.timeout)),
            Ok(Err(join_error)) => return Err(DependencyError::Worker(join_error.to_string())),
            Ok(Ok(result)) => result?,
        };

        if forecast.point.len() != periods || forecast.point.iter().any(|v| !v.is_finite()) {
            return Err(DependencyError::ModelFit(format!(
                "expected {} finite points, got {}",
                periods,
                forecast.point.len()
            )));
        }

        let points = forecast
            .point
            .iter()
            .enumerate()
            .map(|(h, y)| {
                let timestamp = self.frequency.advance(self.origin, h as u32 + 1);
                let interval = forecast.intervals.as_ref().and_then(|iv| {
                    let lower = *iv.lower.get(h)?;
                    let upper = *iv.upper.get(h)?;
                    (lower.is_finite() && upper.is_finite()).then_some((lower, upper))
                });
                let (a, b) = interval.unwrap_or_else(|| {
                    let half_width = y.abs() * BAND_FRACTION;
                    (y - half_width, y + half_width)
                });
                ForecastPoint::bounded(timestamp, *y, a, b)
            })
            .collect();

        Ok(ForecastSeries::new(ModelKind::Seasonal, points))
    }
}

/// MSTL needs the full-size threshold and two complete cycles.
pub fn choose_strategy(n: usize, period: Option<usize>) -> SeasonalStrategy {
    match period {
        Some(period) if period >= 2 && n >= MIN_MSTL_POINTS && n >= 2 * period => {
            SeasonalStrategy::Mstl { period }
        }
        _ => SeasonalStrategy::Ets,
    }
}

fn run_forecaster(
    values: &[f64],
    strategy: SeasonalStrategy,
    horizon: usize,
    level: f64,
) -> DependencyResult<augurs::Forecast> {
    let transformers: Vec<Box<dyn augurs::forecaster::Transformer>> =
        vec![Box::new(LinearInterpolator::default())];

    match strategy {
        SeasonalStrategy::Mstl { period } => {
            let ets = AutoETS::non_seasonal().into_trend_model();
            let mstl = MSTLModel::new(vec![period], ets);
            let mut forecaster = Forecaster::new(mstl).with_transformers(transformers);
            forecaster
                .fit(values)
                .map_err(|e| DependencyError::ModelFit(format!("MSTL fit error: {e}")))?;
            forecaster
                .predict(horizon, level)
                .map_err(|e| DependencyError::ModelFit(format!("MSTL predict error: {e}")))
        }
        SeasonalStrategy::Ets => {
            let ets = AutoETS::non_seasonal();
            let mut forecaster = Forecaster::new(ets).with_transformers(transformers);
            forecaster
                .fit(values)
                .map_err(|e| DependencyError::ModelFit(format!("ETS fit error: {e}")))?;
            forecaster
                .predict(horizon, level)
                .map_err(|e| DependencyError::ModelFit(format!("ETS predict error: {e}")))
        }
    }
}
