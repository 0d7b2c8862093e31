// src/scenario/adjuster.rs
// Applies a scenario multiplier with start offset and linear ramp to a forecast

use crate::domain::model::{ForecastSeries, ScenarioParams};

/// Factor applied at horizon index `i`.
pub fn scenario_factor(params: &ScenarioParams, i: usize) -> f64 {
    let start = params.start_period as usize;
    let ramp = params.ramp_periods as usize;

    if i < start {
        1.0
    } else if ramp == 0 || i >= start + ramp {
        params.multiplier
    } else {
        let progress = (i - start) as f64 / ramp as f64;
        1.0 + (params.multiplier - 1.0) * progress
    }
}

/// Scales value and bounds by the same non-negative factor, so ordering holds.
pub fn apply_scenario(forecast: &ForecastSeries, params: &ScenarioParams) -> ForecastSeries {
    if params.is_neutral() {
        return forecast.clone();
    }
    let points = forecast
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| point.scaled(scenario_factor(params, i)))
        .collect();
    ForecastSeries::new(forecast.model, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(multiplier: f64, start_period: u32, ramp_periods: u32) -> ScenarioParams {
        ScenarioParams {
            multiplier,
            start_period,
            ramp_periods,
            ..ScenarioParams::default()
        }
    }

    #[test]
    fn ramp_progresses_linearly() {
        let p = params(1.3, 1, 3);
        let factors: Vec<f64> = (0..6).map(|i| scenario_factor(&p, i)).collect();
        let expected = [1.0, 1.0, 1.1, 1.2, 1.3, 1.3];
        for (f, e) in factors.iter().zip(expected.iter()) {
            assert_relative_eq!(*f, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_ramp_is_a_step() {
        let p = params(0.5, 2, 0);
        assert_relative_eq!(scenario_factor(&p, 1), 1.0);
        assert_relative_eq!(scenario_factor(&p, 2), 0.5);
    }
}
