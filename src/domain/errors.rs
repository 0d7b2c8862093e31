// src/domain/errors.rs
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded for user {user_id}: {limit} requests per window")]
    RateLimit { user_id: String, limit: u32 },

    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Only validation and rate-limit failures are meant for the caller as distinct kinds.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::RateLimit { .. })
    }
}

impl From<QualityError> for AppError {
    fn from(error: QualityError) -> Self {
        AppError::Validation(error.to_string())
    }
}

/// Reason an external collaborator (language model, seasonal backend, store) failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DependencyError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("network failure: {0}")]
    Network(String),

    #[error("authentication rejected (HTTP {0})")]
    Authentication(u16),

    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("model fit failed: {0}")]
    ModelFit(String),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl DependencyError {
    /// Whether another attempt may succeed (HTTP 429/5xx and transport errors).
    pub fn is_transient(&self) -> bool {
        match self {
            DependencyError::Network(_) => true,
            DependencyError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short machine-friendly tag used in logs and response metadata.
    pub fn kind(&self) -> FailureKind {
        match self {
            DependencyError::Timeout(_) => FailureKind::Timeout,
            DependencyError::Network(_) => FailureKind::Network,
            DependencyError::Authentication(_) => FailureKind::Authentication,
            DependencyError::Upstream { .. } => FailureKind::Upstream,
            DependencyError::MalformedResponse(_) => FailureKind::MalformedResponse,
            DependencyError::NotConfigured(_) => FailureKind::NotConfigured,
            DependencyError::ModelFit(_) => FailureKind::ModelFit,
            DependencyError::Worker(_) => FailureKind::Worker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Network,
    Authentication,
    Upstream,
    MalformedResponse,
    NotConfigured,
    ModelFit,
    Worker,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Network => "network",
            FailureKind::Authentication => "authentication",
            FailureKind::Upstream => "upstream",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::NotConfigured => "not_configured",
            FailureKind::ModelFit => "model_fit",
            FailureKind::Worker => "worker",
        };
        write!(f, "{}", tag)
    }
}

/// Data-quality analysis cannot run on the given dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QualityError {
    #[error("target column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("target column '{0}' contains no numeric values")]
    NonNumericTarget(String),

    #[error("dataset is empty")]
    EmptyDataset,
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type QualityResult<T> = Result<T, QualityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(DependencyError::Upstream { status: 429, body: String::new() }.is_transient());
        assert!(DependencyError::Upstream { status: 503, body: String::new() }.is_transient());
        assert!(DependencyError::Network("reset".into()).is_transient());
        assert!(!DependencyError::Authentication(401).is_transient());
        assert!(!DependencyError::Upstream { status: 400, body: String::new() }.is_transient());
        assert!(!DependencyError::Timeout(Duration::from_secs(1)).is_transient());
    }

    #[test]
    fn user_visible_kinds() {
        assert!(AppError::Validation("x".into()).is_user_visible());
        assert!(AppError::RateLimit { user_id: "u".into(), limit: 1 }.is_user_visible());
        assert!(!AppError::Config("x".into()).is_user_visible());
    }
}
