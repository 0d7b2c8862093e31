// src/analysis/mod.rs
// Pure statistical analysis of datasets and forecasts

pub mod cleaning;
pub mod quality;
pub mod statistics;
pub mod validation;

pub use cleaning::Row;
pub use quality::DataQualityAnalyzer;
pub use validation::ValidationEngine;
