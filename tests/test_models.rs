// tests/test_models.rs
mod common;

use std::time::Duration;

use approx::assert_relative_eq;
use proptest::prelude::*;

use common::{month, monthly_rows, monthly_series, seasonal_values, SALES};
use scenario_forecast::analysis::DataQualityAnalyzer;
use scenario_forecast::domain::errors::DependencyError;
use scenario_forecast::domain::model::{ModelKind, ModelPreference};
use scenario_forecast::models::seasonal::SeasonalStrategy;
use scenario_forecast::models::{
    forecast_with_fallback, FitConfig, FittedModel, LinearTrendState, ModelSelector, SeasonalState,
};

#[test]
fn linear_trend_continues_the_sales_slope() {
    let state = LinearTrendState::fit(&monthly_series(&SALES));
    assert!(state.slope > 4.0 && state.slope < 4.6);

    let forecast = state.predict(6);
    assert_eq!(forecast.len(), 6);
    assert_eq!(forecast.model, ModelKind::LinearTrend);
    assert!(forecast.is_well_ordered());
    assert!(forecast.values().windows(2).all(|w| w[1] > w[0]));
    assert_eq!(forecast.timestamps(), (12..18).map(month).collect::<Vec<_>>());
    assert_relative_eq!(forecast.points[0].y, state.value_at(12), epsilon = 1e-9);
}

#[tokio::test]
async fn seasonal_model_forecasts_with_mstl() {
    let series = monthly_series(&seasonal_values(3));
    let state = SeasonalState::fit(&series, 0.95, Duration::from_secs(30)).unwrap();
    assert_eq!(state.strategy(), SeasonalStrategy::Mstl { period: 12 });

    let forecast = state.predict(6).await.unwrap();
    assert_eq!(forecast.len(), 6);
    assert_eq!(forecast.model, ModelKind::Seasonal);
    assert!(forecast.is_well_ordered());
    assert_eq!(forecast.timestamps(), (36..42).map(month).collect::<Vec<_>>());
    assert!(forecast.values().iter().all(|v| v.is_finite() && *v > 100.0 && *v < 400.0));
}

#[tokio::test]
async fn short_series_uses_plain_ets() {
    let series = monthly_series(&SALES[..10]);
    let model = FittedModel::fit(ModelKind::Seasonal, &series, &FitConfig::default()).unwrap();
    assert_eq!(model.kind(), ModelKind::Seasonal);
    match &model {
        FittedModel::Seasonal(state) => assert_eq!(state.strategy(), SeasonalStrategy::Ets),
        other => panic!("unexpected model {:?}", other),
    }

    let forecast = model.predict(3).await.unwrap();
    assert_eq!(forecast.len(), 3);
    assert!(forecast.is_well_ordered());
}

#[test]
fn seasonal_fit_rejects_tiny_series() {
    let series = monthly_series(&[1.0, 2.0]);
    assert!(matches!(
        FittedModel::fit(ModelKind::Seasonal, &series, &FitConfig::default()),
        Err(DependencyError::ModelFit(_))
    ));
    let linear = FittedModel::fit(ModelKind::LinearTrend, &series, &FitConfig::default()).unwrap();
    assert_eq!(linear.kind(), ModelKind::LinearTrend);
}

#[tokio::test]
async fn failed_seasonal_fit_falls_back_to_linear() {
    let series = monthly_series(&[5.0, 7.0]);
    let (forecast, failure) =
        forecast_with_fallback(ModelKind::Seasonal, &series, &FitConfig::default(), 4).await;

    assert_eq!(forecast.model, ModelKind::LinearTrend);
    assert_eq!(forecast.len(), 4);
    assert!(matches!(failure, Some(DependencyError::ModelFit(_))));
}

#[tokio::test]
async fn seasonal_timeout_falls_back_to_linear() {
    let series = monthly_series(&seasonal_values(3));
    let config = FitConfig {
        confidence_level: 0.95,
        timeout: Duration::ZERO,
    };
    let (forecast, failure) = forecast_with_fallback(ModelKind::Seasonal, &series, &config, 6).await;

    assert_eq!(forecast.model, ModelKind::LinearTrend);
    assert_eq!(forecast.len(), 6);
    assert!(matches!(failure, Some(DependencyError::Timeout(_))));
}

#[tokio::test]
async fn linear_request_never_reports_a_failure() {
    let (forecast, failure) = forecast_with_fallback(
        ModelKind::LinearTrend,
        &monthly_series(&SALES),
        &FitConfig::default(),
        12,
    )
    .await;
    assert_eq!(forecast.len(), 12);
    assert!(failure.is_none());
}

#[test]
fn auto_selects_seasonal_for_cyclic_data() {
    let values = seasonal_values(3);
    let report = DataQualityAnalyzer::default()
        .analyze(&monthly_rows(&values), "sales", Some("month"))
        .unwrap();

    let selection = ModelSelector::default().select(ModelPreference::Auto, values.len(), Some(&report));
    assert_eq!(selection.kind, ModelKind::Seasonal);

    let disabled = ModelSelector::new(false).select(ModelPreference::Auto, values.len(), Some(&report));
    assert_eq!(disabled.kind, ModelKind::LinearTrend);
}

#[test]
fn forced_preferences_are_honoured_with_enough_data() {
    let selector = ModelSelector::default();
    assert_eq!(
        selector.select(ModelPreference::Seasonal, 8, None).kind,
        ModelKind::Seasonal
    );
    assert_eq!(
        selector.select(ModelPreference::Fallback, 48, None).kind,
        ModelKind::LinearTrend
    );

    let disabled = ModelSelector::new(false).select(ModelPreference::Seasonal, 48, None);
    assert_eq!(disabled.kind, ModelKind::LinearTrend);
    assert!(disabled.reason.contains("disabled"));
}

fn preference() -> impl Strategy<Value = ModelPreference> {
    prop_oneof![
        Just(ModelPreference::Auto),
        Just(ModelPreference::Seasonal),
        Just(ModelPreference::Fallback),
    ]
}

proptest! {
    #[test]
    fn tiny_datasets_always_get_the_linear_trend(pref in preference(), n in 0usize..6, enabled in any::<bool>()) {
        let selection = ModelSelector::new(enabled).select(pref, n, None);
        prop_assert_eq!(selection.kind, ModelKind::LinearTrend);
        prop_assert!(!selection.reason.is_empty());
    }

    #[test]
    fn linear_forecast_has_requested_length(
        values in prop::collection::vec(-1.0e4f64..1.0e4, 1..40),
        periods in 1usize..60,
    ) {
        let forecast = LinearTrendState::fit(&monthly_series(&values)).predict(periods);
        prop_assert_eq!(forecast.len(), periods);
        prop_assert!(forecast.is_well_ordered());
    }
}
