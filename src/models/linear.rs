// src/models/linear.rs
// Least-squares trend line used as the always-available fallback model

use chrono::NaiveDate;

use crate::analysis::statistics;
use crate::domain::model::{Frequency, ForecastPoint, ForecastSeries, ModelKind, TimeSeries};

/// Half-width of the forecast band as a fraction of |y|.
pub const BAND_FRACTION: f64 = 0.2;

/// Fitted trend line. Position indices continue from `next_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTrendState {
    pub slope: f64,
    pub intercept: f64,
    pub next_index: usize,
    pub origin: NaiveDate,
    pub frequency: Frequency,
}

impl LinearTrendState {
    /// Fits `value ~ intercept + slope * position`.
    ///
    /// Fewer than two points produce a flat line at the last value (or zero).
    pub fn fit(series: &TimeSeries) -> Self {
        let values = series.values();
        let fit = statistics::linear_regression(&values);
        let origin = series
            .last()
            .map(|p| p.timestamp)
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        Self {
            slope: fit.slope,
            intercept: fit.intercept,
            next_index: values.len(),
            origin,
            frequency: series.frequency(),
        }
    }

    pub fn value_at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }

    pub fn predict(&self, periods: usize) -> ForecastSeries {
        let points = (0..periods)
            .map(|h| {
                let y = self.value_at(self.next_index + h);
                let half_width = y.abs() * BAND_FRACTION;
                let timestamp = self.frequency.advance(self.origin, h as u32 + 1);
                ForecastPoint::bounded(timestamp, y, y - half_width, y + half_width)
            })
            .collect();
        ForecastSeries::new(ModelKind::LinearTrend, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TimeSeriesPoint;
    use approx::assert_relative_eq;

    fn monthly(values: &[f64]) -> TimeSeries {
        TimeSeries::from_points(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    TimeSeriesPoint::new(
                        NaiveDate::from_ymd_opt(2023, i as u32 + 1, 1).unwrap(),
                        *v,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn extrapolates_from_next_index() {
        let state = LinearTrendState::fit(&monthly(&[10.0, 12.0, 14.0, 16.0]));
        assert_eq!(state.next_index, 4);
        let forecast = state.predict(2);
        assert_relative_eq!(forecast.points[0].y, 18.0, epsilon = 1e-9);
        assert_relative_eq!(forecast.points[1].y, 20.0, epsilon = 1e-9);
        assert_eq!(
            forecast.points[0].timestamp,
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
        );
    }

    #[test]
    fn band_is_twenty_percent() {
        let forecast = LinearTrendState::fit(&monthly(&[100.0, 100.0, 100.0])).predict(1);
        assert_relative_eq!(forecast.points[0].y_lower, 80.0, epsilon = 1e-9);
        assert_relative_eq!(forecast.points[0].y_upper, 120.0, epsilon = 1e-9);
    }

    #[test]
    fn negative_values_keep_ordered_band() {
        let forecast = LinearTrendState::fit(&monthly(&[-5.0, -10.0, -15.0])).predict(3);
        assert!(forecast.is_well_ordered());
    }

    #[test]
    fn single_point_is_constant() {
        let forecast = LinearTrendState::fit(&monthly(&[42.0])).predict(3);
        assert!(forecast.values().iter().all(|v| (*v - 42.0).abs() < 1e-12));
    }
}
