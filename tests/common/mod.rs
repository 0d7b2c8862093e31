// tests/common/mod.rs
// Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use serde_json::json;

use scenario_forecast::analysis::Row;
use scenario_forecast::domain::errors::DependencyError;
use scenario_forecast::domain::model::{TimeSeries, TimeSeriesPoint};
use scenario_forecast::domain::service::{ChatCompletionService, ChatRequest};

pub const SALES: [f64; 12] = [
    100.0, 110.0, 105.0, 120.0, 115.0, 125.0, 130.0, 128.0, 135.0, 140.0, 145.0, 150.0,
];

pub fn month(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .and_then(|d| d.checked_add_months(Months::new(i as u32)))
        .unwrap()
}

/// Rows `{"month": "YYYY-MM-01", "sales": v}`.
pub fn monthly_rows(values: &[f64]) -> Vec<Row> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let mut row = Row::new();
            row.insert("month".into(), json!(month(i).format("%Y-%m-%d").to_string()));
            row.insert("sales".into(), json!(v));
            row
        })
        .collect()
}

pub fn monthly_series(values: &[f64]) -> TimeSeries {
    TimeSeries::from_points(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(month(i), *v))
            .collect(),
    )
}

/// Seasonal pattern with a mild trend, `cycles` years of monthly data.
pub fn seasonal_values(cycles: usize) -> Vec<f64> {
    (0..cycles * 12)
        .map(|i| {
            let phase = (i % 12) as f64 / 12.0 * std::f64::consts::TAU;
            200.0 + i as f64 * 1.5 + 40.0 * phase.sin()
        })
        .collect()
}

pub enum Reply {
    Text(String),
    Fail(DependencyError),
    Slow(Duration, String),
}

/// Chat service answering from a script; scenario prompts and explanation
/// prompts get separate replies.
pub struct ScriptedChat {
    scenario: Mutex<Vec<Reply>>,
    explanation: Mutex<Vec<Reply>>,
    pub calls: AtomicUsize,
}

impl ScriptedChat {
    pub fn new(scenario: Vec<Reply>, explanation: Vec<Reply>) -> Self {
        Self {
            scenario: Mutex::new(scenario),
            explanation: Mutex::new(explanation),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn scenario_json(json: &str) -> Self {
        Self::new(vec![Reply::Text(json.to_string())], vec![])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletionService for ScriptedChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, DependencyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queue = if request.prompt.contains("Respond with ONLY a JSON object") {
            &self.scenario
        } else {
            &self.explanation
        };
        let reply = {
            let mut queue = queue.lock().unwrap();
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(DependencyError::Upstream {
                status: 500,
                body: "script exhausted".into(),
            }),
        }
    }
}
