// src/analysis/quality.rs
// Data quality assessment of the raw dataset

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::cleaning::{self, Row};
use crate::analysis::statistics;
use crate::domain::errors::{QualityError, QualityResult};
use crate::domain::model::{
    ColumnMissing, ConsistencyReport, DataQualityReport, DistributionStats, Frequency, LagCorrelation,
    MissingValueSummary, Outlier, OutlierMethod, OutlierReport, OverallQuality, QualityFactors,
    QualityRating, SeasonalityDescriptor, SeasonalityStatus, TimeSeries, TimeSeriesPoint,
    TrendDescriptor, TrendDirection, TrendStrength,
};

/// Candidate seasonal lags probed by the autocorrelation check.
pub const SEASONAL_LAGS: [usize; 4] = [3, 4, 6, 12];
pub const MIN_SEASONALITY_OBSERVATIONS: usize = 12;
const SEASONALITY_THRESHOLD: f64 = 0.5;
const SHORT_SERIES_WARNING: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataQualityAnalyzer {
    pub iqr_multiplier: f64,
    pub z_threshold: f64,
}

impl Default for DataQualityAnalyzer {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            z_threshold: 3.0,
        }
    }
}

impl DataQualityAnalyzer {
    pub fn new(iqr_multiplier: f64, z_threshold: f64) -> Self {
        Self {
            iqr_multiplier,
            z_threshold,
        }
    }

    /// Builds the quality report for `target`.
    ///
    /// `date_column`, when given, enables the duplicate-timestamp and gap checks.
    pub fn analyze(
        &self,
        rows: &[Row],
        target: &str,
        date_column: Option<&str>,
    ) -> QualityResult<DataQualityReport> {
        if rows.is_empty() {
            return Err(QualityError::EmptyDataset);
        }
        if !cleaning::has_column(rows, target) {
            return Err(QualityError::MissingColumn(target.to_string()));
        }

        let (indexed, non_numeric) = cleaning::numeric_column(rows, target);
        if indexed.is_empty() {
            return Err(QualityError::NonNumericTarget(target.to_string()));
        }
        let indices: Vec<usize> = indexed.iter().map(|(i, _)| *i).collect();
        let values: Vec<f64> = indexed.iter().map(|(_, v)| *v).collect();

        let missing_values = missing_value_summary(rows, target);
        let iqr_outliers = detect_iqr_outliers(&values, &indices, self.iqr_multiplier);
        let zscore_outliers = detect_zscore_outliers(&values, &indices, self.z_threshold);
        let distribution = distribution_stats(&values);
        let trend = detect_trend(&values);
        let seasonality = detect_seasonality(&values);
        let consistency = check_consistency(rows, target, date_column, &values, non_numeric);

        let factors = QualityFactors {
            missing_values: percentage_tier(missing_values.target_missing_percentage),
            outliers: percentage_tier(iqr_outliers.percentage(values.len())),
            consistency: consistency.tier(),
        };
        let score =
            (factors.missing_values + factors.outliers + factors.consistency) / 3.0 * 100.0;

        log::debug!(
            "Quality report for '{}': score {:.1}, {} outliers (IQR), {} issues, {} warnings",
            target,
            score,
            iqr_outliers.count(),
            consistency.issues.len(),
            consistency.warnings.len()
        );

        Ok(DataQualityReport {
            target_column: target.to_string(),
            missing_values,
            iqr_outliers,
            zscore_outliers,
            distribution,
            trend,
            seasonality,
            consistency,
            overall_quality: OverallQuality {
                score,
                rating: QualityRating::from_score(score),
                factors,
            },
        })
    }
}

/// 1.0 / 0.8 / 0.6 / 0.4 at <5 / <10 / <20 / >=20 percent.
pub fn percentage_tier(percent: f64) -> f64 {
    if percent < 5.0 {
        1.0
    } else if percent < 10.0 {
        0.8
    } else if percent < 20.0 {
        0.6
    } else {
        0.4
    }
}

pub fn missing_value_summary(rows: &[Row], target: &str) -> MissingValueSummary {
    let total_rows = rows.len();
    let pct = |missing: usize| {
        if total_rows == 0 {
            0.0
        } else {
            missing as f64 / total_rows as f64 * 100.0
        }
    };

    let column_names: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
    let columns: BTreeMap<String, ColumnMissing> = column_names
        .into_iter()
        .map(|name| {
            let missing = rows
                .iter()
                .filter(|row| cleaning::is_missing(row.get(name.as_str())))
                .count();
            (
                name.clone(),
                ColumnMissing {
                    missing,
                    percentage: pct(missing),
                },
            )
        })
        .collect();

    let target_missing = columns.get(target).map_or(total_rows, |c| c.missing);

    MissingValueSummary {
        total_rows,
        target_missing,
        target_missing_percentage: pct(target_missing),
        columns,
    }
}

/// Values outside `[Q1 - k*IQR, Q3 + k*IQR]`. `indices` maps positions back to rows.
pub fn detect_iqr_outliers(values: &[f64], indices: &[usize], multiplier: f64) -> OutlierReport {
    if values.is_empty() {
        return OutlierReport {
            method: OutlierMethod::Iqr,
            threshold: multiplier,
            lower_bound: None,
            upper_bound: None,
            outliers: Vec::new(),
            note: Some("no numeric values".to_string()),
        };
    }

    let sorted = statistics::sorted_copy(values);
    let q1 = statistics::quantile(&sorted, 0.25);
    let q3 = statistics::quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;

    let outliers = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v < lower || **v > upper)
        .map(|(pos, v)| Outlier {
            index: indices.get(pos).copied().unwrap_or(pos),
            value: *v,
        })
        .collect();

    OutlierReport {
        method: OutlierMethod::Iqr,
        threshold: multiplier,
        lower_bound: Some(lower),
        upper_bound: Some(upper),
        outliers,
        note: None,
    }
}

/// Values whose z-score magnitude exceeds `threshold`.
pub fn detect_zscore_outliers(values: &[f64], indices: &[usize], threshold: f64) -> OutlierReport {
    let std = statistics::std_dev(values);
    if values.is_empty() || std <= f64::EPSILON {
        return OutlierReport {
            method: OutlierMethod::ZScore,
            threshold,
            lower_bound: None,
            upper_bound: None,
            outliers: Vec::new(),
            note: Some("standard deviation is zero; z-scores undefined".to_string()),
        };
    }

    let mean = statistics::mean(values);
    let outliers = values
        .iter()
        .enumerate()
        .filter(|(_, v)| ((**v - mean) / std).abs() > threshold)
        .map(|(pos, v)| Outlier {
            index: indices.get(pos).copied().unwrap_or(pos),
            value: *v,
        })
        .collect();

    OutlierReport {
        method: OutlierMethod::ZScore,
        threshold,
        lower_bound: Some(mean - threshold * std),
        upper_bound: Some(mean + threshold * std),
        outliers,
        note: None,
    }
}

pub fn distribution_stats(values: &[f64]) -> DistributionStats {
    let sorted = statistics::sorted_copy(values);
    DistributionStats {
        count: values.len(),
        mean: statistics::mean(values),
        median: statistics::quantile(&sorted, 0.5),
        std: statistics::std_dev(values),
        skewness: statistics::skewness(values),
        kurtosis: statistics::kurtosis(values),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        max: sorted.last().copied().unwrap_or(f64::NAN),
        q1: statistics::quantile(&sorted, 0.25),
        q3: statistics::quantile(&sorted, 0.75),
    }
}

pub fn detect_trend(values: &[f64]) -> TrendDescriptor {
    let fit = statistics::linear_regression(values);

    let direction = if fit.slope > 0.0 {
        TrendDirection::Increasing
    } else if fit.slope < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Flat
    };

    let strength = if fit.r_squared > 0.7 {
        TrendStrength::Strong
    } else if fit.r_squared > 0.5 {
        TrendStrength::Moderate
    } else {
        TrendStrength::Weak
    };

    TrendDescriptor {
        has_trend: fit.r_squared > 0.5,
        direction,
        slope: fit.slope,
        r_squared: fit.r_squared,
        strength,
    }
}

/// Autocorrelation probe over [`SEASONAL_LAGS`]; the strongest lag becomes the period.
pub fn detect_seasonality(values: &[f64]) -> SeasonalityDescriptor {
    if values.len() < MIN_SEASONALITY_OBSERVATIONS {
        return SeasonalityDescriptor {
            has_seasonality: false,
            period: None,
            correlation: None,
            status: SeasonalityStatus::InsufficientData,
            autocorrelations: Vec::new(),
        };
    }

    let autocorrelations: Vec<LagCorrelation> = SEASONAL_LAGS
        .iter()
        .filter(|lag| **lag < values.len())
        .filter_map(|lag| {
            statistics::autocorrelation(values, *lag).map(|correlation| LagCorrelation {
                lag: *lag,
                correlation,
            })
        })
        .collect();

    let strongest = autocorrelations
        .iter()
        .filter(|c| c.correlation.abs() > SEASONALITY_THRESHOLD)
        .max_by(|a, b| {
            a.correlation
                .abs()
                .partial_cmp(&b.correlation.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .copied();

    match strongest {
        Some(best) => SeasonalityDescriptor {
            has_seasonality: true,
            period: Some(best.lag),
            correlation: Some(best.correlation),
            status: SeasonalityStatus::Detected,
            autocorrelations,
        },
        None => SeasonalityDescriptor {
            has_seasonality: false,
            period: None,
            correlation: None,
            status: SeasonalityStatus::NotDetected,
            autocorrelations,
        },
    }
}

fn check_consistency(
    rows: &[Row],
    target: &str,
    date_column: Option<&str>,
    values: &[f64],
    non_numeric: usize,
) -> ConsistencyReport {
    let mut report = ConsistencyReport {
        non_numeric_values: non_numeric,
        ..ConsistencyReport::default()
    };

    if non_numeric > 0 {
        report.issues.push(format!(
            "{} non-numeric values in target column '{}'",
            non_numeric, target
        ));
    }

    let spread = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        - values.iter().cloned().fold(f64::INFINITY, f64::min);
    if spread.abs() <= f64::EPSILON {
        report.zero_variance = true;
        report
            .issues
            .push(format!("target column '{}' has zero variance", target));
    }

    if values.len() < SHORT_SERIES_WARNING {
        report.warnings.push(format!(
            "only {} observations; at least {} recommended",
            values.len(),
            SHORT_SERIES_WARNING
        ));
    }

    if let Some(date_column) = date_column {
        let dated: Vec<TimeSeriesPoint> = rows
            .iter()
            .filter_map(|row| {
                let date = row.get(date_column).and_then(cleaning::parse_date)?;
                let value = row.get(target).and_then(cleaning::coerce_number)?;
                Some(TimeSeriesPoint::new(date, value))
            })
            .collect();
        let series = TimeSeries::from_points(dated);

        if series.merged_duplicates() > 0 {
            report.warnings.push(format!(
                "{} duplicate timestamps in '{}'",
                series.merged_duplicates(),
                date_column
            ));
        }
        let gaps = series.gap_count();
        if gaps > 0 {
            report.warnings.push(format!(
                "{} irregular gaps between observations ({} frequency)",
                gaps,
                frequency_label(&series)
            ));
        }
    }

    report
}

fn frequency_label(series: &TimeSeries) -> String {
    match series.frequency() {
        Frequency::Days(d) => format!("{}-day", d),
        other => format!("{:?}", other).to_lowercase(),
    }
}
