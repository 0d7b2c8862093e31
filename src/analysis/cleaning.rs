// src/analysis/cleaning.rs
// Coercion of loosely-typed dataset cells into numbers and dates

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// A row of the incoming dataset, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Null, absent, blank string or NaN.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null")
        }
        Some(Value::Number(n)) => n.as_f64().map_or(true, |v| v.is_nan()),
        _ => false,
    }
}

/// Numeric value of a cell, accepting strings such as `"$1,250.50"` or `"12 %"`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '%' | ' ' | '_'))
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Calendar date of a cell. `YYYY-MM` maps to the first of the month.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    // ISO datetime without offset, e.g. "2024-01-31T00:00:00" or "2024-01-31 08:00:00"
    if raw.len() > 10 && raw.is_char_boundary(10) {
        if let Ok(date) = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok()
}

/// Numeric target values of all rows, in row order, with their row index.
///
/// Returns the pairs plus the count of present-but-unparsable cells.
pub fn numeric_column(rows: &[Row], column: &str) -> (Vec<(usize, f64)>, usize) {
    let mut values = Vec::with_capacity(rows.len());
    let mut non_numeric = 0;
    for (index, row) in rows.iter().enumerate() {
        let cell = row.get(column);
        if is_missing(cell) {
            continue;
        }
        match cell.and_then(coerce_number) {
            Some(v) => values.push((index, v)),
            None => non_numeric += 1,
        }
    }
    (values, non_numeric)
}

/// Whether any row carries the column, even as null.
pub fn has_column(rows: &[Row], column: &str) -> bool {
    rows.iter().any(|row| row.contains_key(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_from_formatted_strings() {
        assert_eq!(coerce_number(&json!("1,250.5")), Some(1250.5));
        assert_eq!(coerce_number(&json!("$99")), Some(99.0));
        assert_eq!(coerce_number(&json!("12 %")), Some(12.0));
        assert_eq!(coerce_number(&json!(7)), Some(7.0));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn missing_markers() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&Value::Null)));
        assert!(is_missing(Some(&json!("  "))));
        assert!(is_missing(Some(&json!("NaN"))));
        assert!(!is_missing(Some(&json!(0))));
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date(&json!("2024-03-05")), Some(expected));
        assert_eq!(parse_date(&json!("2024-03-05T10:00:00Z")), Some(expected));
        assert_eq!(parse_date(&json!("2024-03-05 10:00:00")), Some(expected));
        assert_eq!(parse_date(&json!("03/05/2024")), Some(expected));
        assert_eq!(parse_date(&json!("2024/03/05")), Some(expected));
        assert_eq!(
            parse_date(&json!("2024-03")),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date(&json!("not a date")), None);
        assert_eq!(parse_date(&json!(20240305)), None);
    }
}
