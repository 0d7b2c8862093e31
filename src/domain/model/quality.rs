// src/domain/model/quality.rs
// Data quality report model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub missing: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueSummary {
    pub total_rows: usize,
    pub target_missing: usize,
    pub target_missing_percentage: f64,
    pub columns: BTreeMap<String, ColumnMissing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    Iqr,
    ZScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub method: OutlierMethod,
    /// IQR multiplier or z-score threshold
    pub threshold: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub outliers: Vec<Outlier>,
    pub note: Option<String>,
}

impl OutlierReport {
    pub fn count(&self) -> usize {
        self.outliers.len()
    }

    pub fn percentage(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.outliers.len() as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Flat => write!(f, "flat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDescriptor {
    pub has_trend: bool,
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    pub strength: TrendStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityStatus {
    Detected,
    NotDetected,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityDescriptor {
    pub has_seasonality: bool,
    pub period: Option<usize>,
    pub correlation: Option<f64>,
    pub status: SeasonalityStatus,
    pub autocorrelations: Vec<LagCorrelation>,
}

/// Structural problems found in the target column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub zero_variance: bool,
    pub non_numeric_values: usize,
}

impl ConsistencyReport {
    pub fn tier(&self) -> f64 {
        if !self.issues.is_empty() {
            0.5
        } else if !self.warnings.is_empty() {
            0.8
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            QualityRating::Excellent
        } else if score >= 60.0 {
            QualityRating::Good
        } else if score >= 40.0 {
            QualityRating::Fair
        } else {
            QualityRating::Poor
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QualityRating::Excellent => write!(f, "excellent"),
            QualityRating::Good => write!(f, "good"),
            QualityRating::Fair => write!(f, "fair"),
            QualityRating::Poor => write!(f, "poor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityFactors {
    pub missing_values: f64,
    pub outliers: f64,
    pub consistency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallQuality {
    pub score: f64,
    pub rating: QualityRating,
    pub factors: QualityFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub target_column: String,
    pub missing_values: MissingValueSummary,
    pub iqr_outliers: OutlierReport,
    pub zscore_outliers: OutlierReport,
    pub distribution: DistributionStats,
    pub trend: TrendDescriptor,
    pub seasonality: SeasonalityDescriptor,
    pub consistency: ConsistencyReport,
    pub overall_quality: OverallQuality,
}

impl DataQualityReport {
    pub fn has_zero_variance(&self) -> bool {
        self.consistency.zero_variance
    }

    pub fn score(&self) -> f64 {
        self.overall_quality.score
    }
}
