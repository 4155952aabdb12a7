//! Rolling Pearson correlation over a trailing window.
//!
//! Each window is independent, so windows are evaluated in parallel with rayon.
//! The output is identical to a sequential scan.

use rayon::prelude::*;

use crate::domain::{CombinedRecord, RecordField, RollingPoint};
use crate::error::AppError;
use crate::math::pearson;

/// Rolling correlation of `xs` and `ys` over a trailing window.
///
/// Output has the same length as the inputs. Position `i` holds the
/// correlation of `xs[i+1-window..=i]` and `ys[i+1-window..=i]`; the first
/// `window - 1` positions are `None` (insufficient history), as is any window
/// where either series is constant.
pub fn rolling_correlation(xs: &[f64], ys: &[f64], window: usize) -> Result<Vec<Option<f64>>, AppError> {
    if window < 2 {
        return Err(AppError::Config(format!(
            "Rolling window must be at least 2 periods (got {window})."
        )));
    }
    if xs.len() != ys.len() {
        return Err(AppError::Config(format!(
            "Rolling correlation inputs differ in length ({} vs {}).",
            xs.len(),
            ys.len()
        )));
    }

    Ok((0..xs.len())
        .into_par_iter()
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            let start = end + 1 - window;
            pearson(&xs[start..=end], &ys[start..=end])
        })
        .collect())
}

/// Rolling correlation between two fields of the combined frame, dated.
pub fn rolling_correlation_series(
    records: &[CombinedRecord],
    a: RecordField,
    b: RecordField,
    window: usize,
) -> Result<Vec<RollingPoint>, AppError> {
    let xs: Vec<f64> = records.iter().map(|r| r.field(a)).collect();
    let ys: Vec<f64> = records.iter().map(|r| r.field(b)).collect();

    let values = rolling_correlation(&xs, &ys, window)?;
    Ok(records
        .iter()
        .zip(values)
        .map(|(r, value)| RollingPoint { date: r.date, value })
        .collect())
}
