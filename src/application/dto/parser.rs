// src/application/dto/parser.rs
// Dataset rows to an ordered time series

use chrono::{Datelike, Months, NaiveDate};

use crate::analysis::cleaning::{self, Row};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::model::{TimeSeries, TimeSeriesPoint};

pub const MIN_SERIES_POINTS: usize = 3;

/// Builds the series used for fitting, anchoring synthetic dates at today.
pub fn prepare_series(rows: &[Row], target: &str, date_column: Option<&str>) -> AppResult<TimeSeries> {
    prepare_series_at(rows, target, date_column, chrono::Utc::now().date_naive())
}

/// Rows with an unparsable date or value are dropped, duplicates averaged, and
/// the result sorted. Without a date column, rows get consecutive monthly dates
/// ending in the month of `today`.
pub fn prepare_series_at(
    rows: &[Row],
    target: &str,
    date_column: Option<&str>,
    today: NaiveDate,
) -> AppResult<TimeSeries> {
    let points = match date_column {
        Some(column) => dated_points(rows, target, column)?,
        None => synthetic_monthly_points(rows, target, today),
    };

    let dropped = rows.len().saturating_sub(points.len());
    if dropped > 0 {
        log::debug!("Dropped {} rows without a usable value or date", dropped);
    }

    let series = TimeSeries::from_points(points);
    if series.len() < MIN_SERIES_POINTS {
        return Err(AppError::Validation(format!(
            "at least {} data points required, got {}",
            MIN_SERIES_POINTS,
            series.len()
        )));
    }
    Ok(series)
}

fn dated_points(rows: &[Row], target: &str, column: &str) -> AppResult<Vec<TimeSeriesPoint>> {
    if !cleaning::has_column(rows, column) {
        return Err(AppError::Validation(format!(
            "date column '{}' not found in dataset",
            column
        )));
    }
    Ok(rows
        .iter()
        .filter_map(|row| {
            let date = row.get(column).and_then(cleaning::parse_date)?;
            let value = row.get(target).and_then(cleaning::coerce_number)?;
            Some(TimeSeriesPoint::new(date, value))
        })
        .collect())
}

fn synthetic_monthly_points(rows: &[Row], target: &str, today: NaiveDate) -> Vec<TimeSeriesPoint> {
    let (values, _) = cleaning::numeric_column(rows, target);
    let end = today.with_day(1).unwrap_or(today);
    let count = values.len() as u32;

    values
        .into_iter()
        .enumerate()
        .map(|(i, (_, value))| {
            let back = count - 1 - i as u32;
            let date = end.checked_sub_months(Months::new(back)).unwrap_or(end);
            TimeSeriesPoint::new(date, value)
        })
        .collect()
}
