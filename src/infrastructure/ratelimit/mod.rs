// src/infrastructure/ratelimit/mod.rs
// In-memory fixed-window request counters

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::DependencyError;
use crate::domain::repository::RateLimitStore;

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    counters: Mutex<HashMap<String, (u64, Instant)>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn increment_with_expiry(&self, key: &str, window: Duration) -> Result<u64, DependencyError> {
        let mut counters = self.counters.lock().await;
        let now = Instant::now();
        counters.retain(|_, (_, resets_at)| *resets_at > now);
        let entry = counters.entry(key.to_string()).or_insert((0, now + window));
        entry.0 += 1;
        Ok(entry.0)
    }

    async fn current(&self, key: &str) -> Result<u64, DependencyError> {
        let counters = self.counters.lock().await;
        Ok(match counters.get(key) {
            Some((count, resets_at)) if *resets_at > Instant::now() => *count,
            _ => 0,
        })
    }
}
