//! Annualized return/volatility metrics for monthly returns.

use crate::domain::AnnualizedMetrics;
use crate::math::{mean, sample_std};

const PERIODS_PER_YEAR: f64 = 12.0;

/// Annualize a monthly return series.
///
/// - return: `(1 + mean_monthly)^12 - 1`, compounding the *mean* monthly
///   return rather than the realized path
/// - volatility: sample std of monthly returns times `sqrt(12)`
/// - Sharpe: return / volatility, defined as `0` when volatility is exactly `0`
///   (no risk-free rate is subtracted)
///
/// `None` for fewer than two observations (sample std undefined).
pub fn annualized_metrics(monthly_returns: &[f64]) -> Option<AnnualizedMetrics> {
    let mean_monthly = mean(monthly_returns)?;
    let std_monthly = sample_std(monthly_returns)?;

    let annualized_return = (1.0 + mean_monthly).powf(PERIODS_PER_YEAR) - 1.0;
    let annualized_volatility = std_monthly * PERIODS_PER_YEAR.sqrt();
    let sharpe_ratio = if annualized_volatility == 0.0 {
        0.0
    } else {
        annualized_return / annualized_volatility
    };

    Some(AnnualizedMetrics {
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_one_percent_std_two_percent() {
        // Two points 0.01 ± d have mean 0.01 and sample std sqrt(2)·d.
        let d = 0.02 / 2.0_f64.sqrt();
        let m = annualized_metrics(&[0.01 + d, 0.01 - d]).unwrap();

        assert!((m.annualized_return - (1.01_f64.powi(12) - 1.0)).abs() < 1e-12);
        assert!((m.annualized_return - 0.1268).abs() < 1e-4);
        assert!((m.annualized_volatility - 0.0693).abs() < 1e-4);
        assert!((m.sharpe_ratio - 1.831).abs() < 1e-3);
    }

    #[test]
    fn zero_volatility_gives_zero_sharpe() {
        let m = annualized_metrics(&[0.01, 0.01]).unwrap();
        assert_eq!(m.annualized_volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert!(m.annualized_return > 0.0);
    }

    #[test]
    fn too_few_observations() {
        assert!(annualized_metrics(&[]).is_none());
        assert!(annualized_metrics(&[0.02]).is_none());
    }
}
