//! Periodic and cumulative returns.

use crate::domain::{NOMINAL_RETURN, Observation, PriceSeries, ReturnSeries};
use crate::error::AppError;

/// Simple returns between consecutive prices of `column`: `p_t / p_{t-1} - 1`.
///
/// The first observation has no predecessor and produces no return (it is
/// dropped, not set to zero). Missing prices are skipped before differencing,
/// and a non-positive previous price yields no return for that step.
pub fn calculate_returns(prices: &PriceSeries, column: &str) -> Result<ReturnSeries, AppError> {
    let observations = prices.column(column).ok_or_else(|| AppError::Schema {
        context: "price series".to_string(),
        message: format!(
            "Price column `{column}` not found (available: {}).",
            prices.columns.join(", ")
        ),
    })?;

    Ok(ReturnSeries::new(NOMINAL_RETURN, simple_returns(&observations)))
}

/// Simple returns over an ordered observation slice.
pub fn simple_returns(prices: &[Observation]) -> Vec<Observation> {
    prices
        .windows(2)
        .filter_map(|w| {
            let (prev, cur) = (w[0], w[1]);
            if prev.value <= 0.0 || !prev.value.is_finite() || !cur.value.is_finite() {
                return None;
            }
            Some(Observation::new(cur.date, cur.value / prev.value - 1.0))
        })
        .collect()
}

/// Geometric compounding: `C_t = Π_{i<=t} (1 + r_i) - 1`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0_f64, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth - 1.0)
        })
        .collect()
}
