// src/domain/model/series.rs
// Observed time series and sampling frequency

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDate,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: NaiveDate, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered series, unique per timestamp, ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: Vec<TimeSeriesPoint>,
    merged_duplicates: usize,
}

impl TimeSeries {
    /// Sorts the points and averages values sharing a timestamp.
    pub fn from_points(mut points: Vec<TimeSeriesPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);

        let mut merged: Vec<TimeSeriesPoint> = Vec::with_capacity(points.len());
        let mut run_len = 1usize;
        let mut merged_duplicates = 0;

        for point in points {
            match merged.last_mut() {
                Some(last) if last.timestamp == point.timestamp => {
                    // running mean over the duplicate run
                    run_len += 1;
                    last.value += (point.value - last.value) / run_len as f64;
                    merged_duplicates += 1;
                }
                _ => {
                    run_len = 1;
                    merged.push(point);
                }
            }
        }

        Self {
            points: merged,
            merged_duplicates,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn last(&self) -> Option<&TimeSeriesPoint> {
        self.points.last()
    }

    /// Number of input rows folded into an existing timestamp.
    pub fn merged_duplicates(&self) -> usize {
        self.merged_duplicates
    }

    /// Ordered split: `[0, at)` and `[at, len)`.
    pub fn split_at(&self, at: usize) -> (TimeSeries, TimeSeries) {
        let at = at.min(self.points.len());
        let (head, tail) = self.points.split_at(at);
        (
            TimeSeries {
                points: head.to_vec(),
                merged_duplicates: 0,
            },
            TimeSeries {
                points: tail.to_vec(),
                merged_duplicates: 0,
            },
        )
    }

    pub fn frequency(&self) -> Frequency {
        Frequency::infer(&self.timestamps())
    }

    /// Count of consecutive observations spaced wider than 1.5 nominal steps.
    pub fn gap_count(&self) -> usize {
        let nominal = self.frequency().nominal_days();
        self.points
            .windows(2)
            .filter(|w| (w[1].timestamp - w[0].timestamp).num_days() as f64 > nominal * 1.5)
            .count()
    }
}

/// Sampling frequency inferred from the median spacing between observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Days(i64),
}

impl Frequency {
    pub fn infer(timestamps: &[NaiveDate]) -> Self {
        if timestamps.len() < 2 {
            return Frequency::Monthly;
        }

        let mut diffs: Vec<i64> = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .filter(|d| *d > 0)
            .collect();
        if diffs.is_empty() {
            return Frequency::Monthly;
        }
        diffs.sort_unstable();
        let median = diffs[diffs.len() / 2];

        match median {
            i64::MIN..=1 => Frequency::Daily,
            6..=8 => Frequency::Weekly,
            28..=31 => Frequency::Monthly,
            88..=92 => Frequency::Quarterly,
            364..=366 => Frequency::Yearly,
            other => Frequency::Days(other),
        }
    }

    pub fn nominal_days(&self) -> f64 {
        match self {
            Frequency::Daily => 1.0,
            Frequency::Weekly => 7.0,
            Frequency::Monthly => 30.44,
            Frequency::Quarterly => 91.31,
            Frequency::Yearly => 365.25,
            Frequency::Days(d) => *d as f64,
        }
    }

    /// Date `steps` periods after `from`.
    pub fn advance(&self, from: NaiveDate, steps: u32) -> NaiveDate {
        let by_days = |days: i64| from + Duration::days(days * steps as i64);
        match self {
            Frequency::Daily => by_days(1),
            Frequency::Weekly => by_days(7),
            Frequency::Monthly => from
                .checked_add_months(Months::new(steps))
                .unwrap_or_else(|| by_days(30)),
            Frequency::Quarterly => from
                .checked_add_months(Months::new(steps * 3))
                .unwrap_or_else(|| by_days(91)),
            Frequency::Yearly => from
                .checked_add_months(Months::new(steps * 12))
                .unwrap_or_else(|| by_days(365)),
            Frequency::Days(d) => by_days(*d),
        }
    }

    /// Observations per yearly cycle (weekly cycle for daily data).
    pub fn seasonal_period(&self) -> Option<usize> {
        match self {
            Frequency::Daily => Some(7),
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::Yearly | Frequency::Days(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn from_points_sorts_and_merges_duplicates() {
        let series = TimeSeries::from_points(vec![
            TimeSeriesPoint::new(date(2024, 3, 1), 30.0),
            TimeSeriesPoint::new(date(2024, 1, 1), 10.0),
            TimeSeriesPoint::new(date(2024, 1, 1), 20.0),
            TimeSeriesPoint::new(date(2024, 2, 1), 5.0),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.merged_duplicates(), 1);
        assert_eq!(series.values(), vec![15.0, 5.0, 30.0]);
    }

    #[test]
    fn infers_monthly_and_advances_by_calendar_month() {
        let stamps: Vec<NaiveDate> = (1..=6).map(|m| date(2024, m, 28)).collect();
        let freq = Frequency::infer(&stamps);
        assert_eq!(freq, Frequency::Monthly);
        assert_eq!(freq.advance(date(2024, 1, 31), 1), date(2024, 2, 29));
    }

    #[test]
    fn gap_detection_flags_skipped_periods() {
        let series = TimeSeries::from_points(vec![
            TimeSeriesPoint::new(date(2024, 1, 1), 1.0),
            TimeSeriesPoint::new(date(2024, 1, 2), 1.0),
            TimeSeriesPoint::new(date(2024, 1, 3), 1.0),
            TimeSeriesPoint::new(date(2024, 1, 7), 1.0),
        ]);
        assert_eq!(series.frequency(), Frequency::Daily);
        assert_eq!(series.gap_count(), 1);
    }
}
