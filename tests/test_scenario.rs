// tests/test_scenario.rs
mod common;

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use proptest::prelude::*;

use common::{Reply, ScriptedChat};
use scenario_forecast::domain::errors::DependencyError;
use scenario_forecast::domain::model::{
    ForecastPoint, ForecastSeries, ModelKind, ScenarioConfidence, ScenarioParams, ScenarioSource,
    TimeHorizon,
};
use scenario_forecast::scenario::{apply_scenario, ScenarioInterpreter};

fn columns() -> Vec<String> {
    vec!["month".to_string(), "sales".to_string()]
}

fn interpreter(chat: Arc<ScriptedChat>) -> ScenarioInterpreter {
    ScenarioInterpreter::new(Some(chat), Duration::from_millis(200))
}

#[tokio::test]
async fn language_model_reply_is_used() {
    let chat = Arc::new(ScriptedChat::scenario_json(
        "```json\n{\"multiplier\": 1.25, \"start_period\": 2, \"ramp_periods\": 2, \
         \"time_horizon\": \"short_term\", \"confidence\": \"high\"}\n```",
    ));
    let parsed = interpreter(chat.clone())
        .interpret("a big promotion lifts sales by a quarter", &columns())
        .await;

    assert_eq!(parsed.source, ScenarioSource::LanguageModel);
    assert!(parsed.fallback_reason.is_none());
    assert_relative_eq!(parsed.params.multiplier, 1.25);
    assert_eq!(parsed.params.start_period, 2);
    assert_eq!(parsed.params.time_horizon, TimeHorizon::ShortTerm);
    assert_eq!(parsed.params.confidence, ScenarioConfidence::High);
    assert_eq!(chat.call_count(), 1);
}

#[tokio::test]
async fn empty_text_makes_no_call() {
    let chat = Arc::new(ScriptedChat::new(vec![], vec![]));
    let parsed = interpreter(chat.clone()).interpret("   ", &columns()).await;

    assert_eq!(parsed.source, ScenarioSource::Empty);
    assert_eq!(parsed.params, ScenarioParams::default());
    assert_eq!(chat.call_count(), 0);
}

#[tokio::test]
async fn rejected_credentials_fall_back_with_reason() {
    let chat = Arc::new(ScriptedChat::new(
        vec![Reply::Fail(DependencyError::Authentication(401))],
        vec![],
    ));
    let parsed = interpreter(chat)
        .interpret("decrease 15% starting next month", &columns())
        .await;

    assert_eq!(parsed.source, ScenarioSource::KeywordFallback);
    assert!(parsed.fallback_reason.unwrap().contains("401"));
    assert_relative_eq!(parsed.params.multiplier, 0.85, epsilon = 1e-12);
    assert_eq!(parsed.params.start_period, 1);
}

#[tokio::test]
async fn malformed_reply_falls_back() {
    let chat = Arc::new(ScriptedChat::scenario_json("Sales will probably go up."));
    let parsed = interpreter(chat).interpret("increase 10%", &columns()).await;

    assert_eq!(parsed.source, ScenarioSource::KeywordFallback);
    assert!(parsed.fallback_reason.unwrap().contains("malformed"));
    assert_relative_eq!(parsed.params.multiplier, 1.10, epsilon = 1e-12);
}

#[tokio::test]
async fn invalid_values_fall_back() {
    let chat = Arc::new(ScriptedChat::scenario_json(
        r#"{"multiplier": -2, "start_period": 0, "ramp_periods": 0}"#,
    ));
    let parsed = interpreter(chat).interpret("grow 5%", &columns()).await;

    assert_eq!(parsed.source, ScenarioSource::KeywordFallback);
    assert_relative_eq!(parsed.params.multiplier, 1.05, epsilon = 1e-12);
}

#[tokio::test]
async fn slow_model_times_out() {
    let chat = Arc::new(ScriptedChat::new(
        vec![Reply::Slow(
            Duration::from_secs(5),
            r#"{"multiplier": 2.0, "start_period": 0, "ramp_periods": 0}"#.to_string(),
        )],
        vec![],
    ));
    let parsed = ScenarioInterpreter::new(Some(chat), Duration::from_millis(20))
        .interpret("increase 10%", &columns())
        .await;

    assert_eq!(parsed.source, ScenarioSource::KeywordFallback);
    assert!(parsed.fallback_reason.unwrap().contains("timed out"));
    assert_relative_eq!(parsed.params.multiplier, 1.10, epsilon = 1e-12);
}

#[tokio::test]
async fn offline_interpreter_uses_keywords() {
    let parsed = ScenarioInterpreter::offline()
        .interpret("increase 10% starting next month, gradual over 3 months", &columns())
        .await;

    assert_eq!(parsed.source, ScenarioSource::KeywordFallback);
    assert_relative_eq!(parsed.params.multiplier, 1.10, epsilon = 1e-12);
    assert_eq!(parsed.params.start_period, 1);
    assert_eq!(parsed.params.ramp_periods, 3);
}

fn forecast(values: &[f64]) -> ForecastSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ForecastSeries::new(
        ModelKind::LinearTrend,
        values
            .iter()
            .enumerate()
            .map(|(i, y)| {
                ForecastPoint::bounded(start + chrono::Duration::days(i as i64), *y, y * 0.8, y * 1.2)
            })
            .collect(),
    )
}

fn params(multiplier: f64, start_period: u32, ramp_periods: u32) -> ScenarioParams {
    ScenarioParams {
        multiplier,
        start_period,
        ramp_periods,
        ..ScenarioParams::default()
    }
}

#[test]
fn neutral_multiplier_is_identity() {
    let raw = forecast(&[10.0, -3.0, 7.5, 0.0]);
    assert_eq!(apply_scenario(&raw, &params(1.0, 0, 3)), raw);
}

#[test]
fn zero_ramp_applies_full_multiplier_from_start() {
    let raw = forecast(&[10.0; 5]);
    let adjusted = apply_scenario(&raw, &params(1.5, 2, 0));
    assert_eq!(adjusted.values(), vec![10.0, 10.0, 15.0, 15.0, 15.0]);
    assert_relative_eq!(adjusted.upper()[2], 18.0, epsilon = 1e-9);
}

proptest! {
    #[test]
    fn adjustment_preserves_bound_ordering(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..40),
        multiplier in 0.0f64..5.0,
        start in 0u32..10,
        ramp in 0u32..10,
    ) {
        let adjusted = apply_scenario(&forecast(&values), &params(multiplier, start, ramp));
        prop_assert_eq!(adjusted.len(), values.len());
        prop_assert!(adjusted.is_well_ordered());
    }

    #[test]
    fn indices_before_start_are_untouched(
        values in prop::collection::vec(1.0f64..1000.0, 1..30),
        multiplier in 0.0f64..3.0,
        start in 0u32..30,
        ramp in 0u32..5,
    ) {
        let raw = forecast(&values);
        let adjusted = apply_scenario(&raw, &params(multiplier, start, ramp));
        for i in 0..(start as usize).min(values.len()) {
            prop_assert_eq!(adjusted.points[i], raw.points[i]);
        }
    }
}
