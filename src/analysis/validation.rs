// src/analysis/validation.rs
// Holdout accuracy metrics and weighted confidence scoring

use crate::analysis::statistics;
use crate::domain::model::{ConfidenceFactors, ConfidenceRating, ConfidenceScore, ValidationMetrics};

pub const MIN_HOLDOUT_POINTS: usize = 10;
const TRAIN_FRACTION: f64 = 0.8;

const QUANTITY_WEIGHT: f64 = 0.3;
const QUALITY_WEIGHT: f64 = 0.3;
const ACCURACY_WEIGHT: f64 = 0.4;
const RECOMMENDATION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Number of training points for a temporal holdout, or `None` below the minimum.
    pub fn holdout_split(&self, n: usize) -> Option<usize> {
        if n < MIN_HOLDOUT_POINTS {
            return None;
        }
        let split = (n as f64 * TRAIN_FRACTION).floor() as usize;
        Some(split.clamp(1, n - 1))
    }

    /// MAPE (percent, zero actuals excluded), RMSE, MAE and R² over paired values.
    pub fn compute_metrics(&self, actual: &[f64], predicted: &[f64]) -> ValidationMetrics {
        let pairs: Vec<(f64, f64)> = actual
            .iter()
            .zip(predicted.iter())
            .map(|(a, p)| (*a, *p))
            .filter(|(a, p)| a.is_finite() && p.is_finite())
            .collect();

        if pairs.is_empty() {
            return ValidationMetrics {
                mape: None,
                rmse: None,
                mae: None,
                r_squared: None,
            };
        }

        let n = pairs.len() as f64;
        let mae = pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
        let mse = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n;

        let nonzero: Vec<&(f64, f64)> = pairs.iter().filter(|(a, _)| *a != 0.0).collect();
        let mape = if nonzero.is_empty() {
            None
        } else {
            Some(
                nonzero.iter().map(|(a, p)| ((a - p) / a).abs()).sum::<f64>()
                    / nonzero.len() as f64
                    * 100.0,
            )
        };

        let actual_mean = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
        let ss_tot: f64 = pairs.iter().map(|(a, _)| (a - actual_mean).powi(2)).sum();
        let ss_res: f64 = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum();
        let r_squared = if ss_tot <= f64::EPSILON {
            None
        } else {
            Some(1.0 - ss_res / ss_tot)
        };

        ValidationMetrics {
            mape,
            rmse: Some(mse.sqrt()),
            mae: Some(mae),
            r_squared,
        }
    }

    /// Weighted confidence over data quantity, target dispersion and holdout accuracy.
    ///
    /// `metrics` is `None` when no holdout was run.
    pub fn confidence_score(
        &self,
        data_points: usize,
        values: &[f64],
        metrics: Option<&ValidationMetrics>,
    ) -> ConfidenceScore {
        let factors = ConfidenceFactors {
            data_quantity: quantity_tier(data_points),
            data_quality: dispersion_tier(statistics::coefficient_of_variation(values)),
            validation_accuracy: accuracy_tier(metrics),
        };
        score_factors(factors)
    }
}

/// >=24 / >=12 / >=6 / fewer.
pub fn quantity_tier(n: usize) -> f64 {
    if n >= 24 {
        1.0
    } else if n >= 12 {
        0.8
    } else if n >= 6 {
        0.6
    } else {
        0.4
    }
}

/// Tier by coefficient of variation; undefined (zero mean) scores lowest.
pub fn dispersion_tier(cv: Option<f64>) -> f64 {
    match cv {
        Some(cv) if cv < 0.2 => 1.0,
        Some(cv) if cv < 0.5 => 0.8,
        Some(cv) if cv < 1.0 => 0.6,
        _ => 0.4,
    }
}

pub fn accuracy_tier(metrics: Option<&ValidationMetrics>) -> f64 {
    match metrics {
        None => 0.7,
        Some(ValidationMetrics { mape: None, .. }) => 0.4,
        Some(ValidationMetrics {
            mape: Some(mape), ..
        }) => {
            if *mape < 10.0 {
                1.0
            } else if *mape < 20.0 {
                0.8
            } else if *mape < 30.0 {
                0.6
            } else {
                0.4
            }
        }
    }
}

pub fn score_factors(factors: ConfidenceFactors) -> ConfidenceScore {
    let overall_score = (factors.data_quantity * QUANTITY_WEIGHT
        + factors.data_quality * QUALITY_WEIGHT
        + factors.validation_accuracy * ACCURACY_WEIGHT)
        * 100.0;

    let mut recommendations = Vec::new();
    if factors.data_quantity < RECOMMENDATION_THRESHOLD {
        recommendations
            .push("Add more historical observations; 24 or more improves reliability".to_string());
    }
    if factors.data_quality < RECOMMENDATION_THRESHOLD {
        recommendations.push(
            "The target is highly variable; review outliers or aggregate to a coarser period"
                .to_string(),
        );
    }
    if factors.validation_accuracy < RECOMMENDATION_THRESHOLD {
        recommendations.push(
            "Holdout accuracy is limited; treat the forecast as directional and revisit with new data"
                .to_string(),
        );
    }

    ConfidenceScore {
        overall_score,
        rating: ConfidenceRating::from_score(overall_score),
        factors,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn split_is_eighty_percent() {
        let engine = ValidationEngine::new();
        assert_eq!(engine.holdout_split(9), None);
        assert_eq!(engine.holdout_split(10), Some(8));
        assert_eq!(engine.holdout_split(12), Some(9));
        assert_eq!(engine.holdout_split(25), Some(20));
    }

    #[test]
    fn mape_excludes_zero_actuals() {
        let m = ValidationEngine::new().compute_metrics(&[0.0, 100.0], &[5.0, 110.0]);
        assert_relative_eq!(m.mape.unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(m.mae.unwrap(), 7.5, epsilon = 1e-9);
    }

    #[test]
    fn all_zero_actuals_leave_mape_unbounded() {
        let m = ValidationEngine::new().compute_metrics(&[0.0, 0.0], &[1.0, 2.0]);
        assert!(m.mape.is_none());
        assert!(m.r_squared.is_none());
        assert_relative_eq!(accuracy_tier(Some(&m)), 0.4);
    }

    #[test]
    fn perfect_prediction() {
        let m = ValidationEngine::new().compute_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_relative_eq!(m.rmse.unwrap(), 0.0);
        assert_relative_eq!(m.r_squared.unwrap(), 1.0);
    }

    #[test]
    fn no_holdout_scores_point_seven() {
        assert_relative_eq!(accuracy_tier(None), 0.7);
    }
}
