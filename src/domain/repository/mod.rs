// src/domain/repository/mod.rs
// Store interfaces for ephemeral orchestrator state

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::DependencyError;

/// Key-value store for serialized forecast results.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<String>, DependencyError>;

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), DependencyError>;
}

/// Counter store backing per-user rate limits.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Atomically increments the counter for `key`, starting a fresh window of
    /// length `window` when none is active, and returns the new count.
    async fn increment_with_expiry(&self, key: &str, window: Duration) -> Result<u64, DependencyError>;

    /// Current count within the active window (0 when none).
    async fn current(&self, key: &str) -> Result<u64, DependencyError>;
}
