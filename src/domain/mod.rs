// src/domain/mod.rs
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, DependencyError, DependencyResult, QualityError};
pub use model::{
    ConfidenceScore, DataQualityReport, ForecastPoint, ForecastSeries, ModelKind, ModelPreference,
    ParsedScenario, ScenarioParams, TimeSeries, TimeSeriesPoint, ValidationMetrics,
};
