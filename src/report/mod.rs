//! Reporting utilities: correlation summaries and formatted terminal output.

use chrono::NaiveDate;

use crate::domain::{CombinedRecord, RecordField, RollingPoint};
use crate::math::{mean, min_max, pearson};

pub mod format;

pub use format::*;

/// Summary of the defined values of a rolling correlation series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationSummary {
    pub defined: usize,
    pub latest: (NaiveDate, f64),
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// `None` when no window produced a value.
pub fn summarize_correlation(points: &[RollingPoint]) -> Option<CorrelationSummary> {
    let defined: Vec<(NaiveDate, f64)> = points.iter().filter_map(|p| p.value.map(|v| (p.date, v))).collect();
    let latest = *defined.last()?;
    let values: Vec<f64> = defined.iter().map(|d| d.1).collect();
    let (min, max) = min_max(&values)?;

    Some(CorrelationSummary {
        defined: defined.len(),
        latest,
        mean: mean(&values)?,
        min,
        max,
    })
}

/// Pearson correlation of two fields over the whole aligned sample.
pub fn full_sample_correlation(records: &[CombinedRecord], a: RecordField, b: RecordField) -> Option<f64> {
    let xs: Vec<f64> = records.iter().map(|r| r.field(a)).collect();
    let ys: Vec<f64> = records.iter().map(|r| r.field(b)).collect();
    pearson(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, 28).unwrap()
    }

    #[test]
    fn summary_skips_undefined_positions() {
        let points = [
            RollingPoint { date: d(1), value: None },
            RollingPoint { date: d(2), value: Some(0.2) },
            RollingPoint { date: d(3), value: Some(-0.4) },
            RollingPoint { date: d(4), value: None },
        ];
        let s = summarize_correlation(&points).unwrap();

        assert_eq!(s.defined, 2);
        assert_eq!(s.latest, (d(3), -0.4));
        assert!((s.mean + 0.1).abs() < 1e-12);
        assert_eq!((s.min, s.max), (-0.4, 0.2));
    }

    #[test]
    fn summary_of_undefined_series_is_none() {
        let points = [RollingPoint { date: d(1), value: None }];
        assert!(summarize_correlation(&points).is_none());
        assert!(summarize_correlation(&[]).is_none());
    }
}
