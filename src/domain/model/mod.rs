// src/domain/model/mod.rs
// Core domain models

pub mod forecast;
pub mod quality;
pub mod scenario;
pub mod series;
pub mod validation;

pub use forecast::{ForecastPoint, ForecastSeries, ModelKind, ModelPreference};
pub use quality::{
    ColumnMissing, ConsistencyReport, DataQualityReport, DistributionStats, LagCorrelation,
    MissingValueSummary, Outlier, OutlierMethod, OutlierReport, OverallQuality, QualityFactors,
    QualityRating, SeasonalityDescriptor, SeasonalityStatus, TrendDescriptor, TrendDirection,
    TrendStrength,
};
pub use scenario::{ParsedScenario, ScenarioConfidence, ScenarioParams, ScenarioSource, TimeHorizon};
pub use series::{Frequency, TimeSeries, TimeSeriesPoint};
pub use validation::{ConfidenceFactors, ConfidenceRating, ConfidenceScore, ValidationMetrics};
