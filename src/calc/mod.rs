//! Financial calculations: returns, alignment, real returns, regimes,
//! rolling correlation and annualized metrics.
//!
//! Every function here is a pure transformation: inputs are borrowed, new
//! values are returned, nothing is mutated in place.

pub mod align;
pub mod correlation;
pub mod metrics;
pub mod regime;
pub mod returns;

pub use align::*;
pub use correlation::*;
pub use metrics::*;
pub use regime::*;
pub use returns::*;

use crate::domain::{AlignedPoint, CombinedRecord};

/// Derive the full combined frame from aligned rows.
///
/// Real returns, both cumulative series and regimes are computed over the
/// same aligned date range.
pub fn build_combined(aligned: &[AlignedPoint]) -> Vec<CombinedRecord> {
    let nominal: Vec<f64> = aligned.iter().map(|p| p.nominal_return).collect();
    let inflation: Vec<f64> = aligned.iter().map(|p| p.inflation_rate).collect();
    let real = calculate_real_returns(aligned);

    let cumulative_nominal = cumulative_returns(&nominal);
    let cumulative_real = cumulative_returns(&real);
    let regimes = add_inflation_regimes(&inflation);

    aligned
        .iter()
        .enumerate()
        .map(|(i, p)| CombinedRecord {
            date: p.date,
            inflation_rate: p.inflation_rate,
            nominal_return: p.nominal_return,
            real_return: real[i],
            cumulative_nominal: cumulative_nominal[i],
            cumulative_real: cumulative_real[i],
            regime: regimes[i],
        })
        .collect()
}
