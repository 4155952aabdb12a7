//! Inflation regime classification and per-regime statistics.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{CombinedRecord, InflationRegime, RangeStats, RegimeStats, SummaryStats};
use crate::math::{mean, min_max, round4, sample_std};

/// Lower bound (inclusive) of the moderate regime.
pub const MODERATE_THRESHOLD: f64 = 0.01;
/// Lower bound (inclusive) of the high regime.
pub const HIGH_THRESHOLD: f64 = 0.03;

/// Classify an annual inflation rate (decimal).
///
/// Total over `f64`: `< 1%` Low, `[1%, 3%)` Moderate, everything else High
/// (including NaN, which fails both comparisons).
pub fn classify_inflation_regime(inflation_rate: f64) -> InflationRegime {
    if inflation_rate < MODERATE_THRESHOLD {
        InflationRegime::Low
    } else if inflation_rate < HIGH_THRESHOLD {
        InflationRegime::Moderate
    } else {
        InflationRegime::High
    }
}

/// Regime label for each rate, in order.
pub fn add_inflation_regimes(inflation_rates: &[f64]) -> Vec<InflationRegime> {
    inflation_rates
        .iter()
        .copied()
        .map(classify_inflation_regime)
        .collect()
}

/// Group records by regime and summarize returns and inflation.
///
/// Regimes without observations are omitted. Rows are ordered Low, Moderate,
/// High and all figures are rounded to 4 decimals.
pub fn analyze_by_regime(records: &[CombinedRecord]) -> Vec<RegimeStats> {
    let mut groups: BTreeMap<InflationRegime, Vec<&CombinedRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.regime).or_default().push(r);
    }

    groups
        .into_iter()
        .filter_map(|(regime, rows)| {
            let nominal: Vec<f64> = rows.iter().map(|r| r.nominal_return).collect();
            let real: Vec<f64> = rows.iter().map(|r| r.real_return).collect();
            let inflation: Vec<f64> = rows.iter().map(|r| r.inflation_rate).collect();

            let stats = RegimeStats {
                regime,
                count: rows.len(),
                nominal_return: summarize(&nominal)?,
                real_return: summarize(&real)?,
                inflation_rate: range(&inflation)?,
            };
            debug!(regime = %regime, count = stats.count, "summarized regime");
            Some(stats)
        })
        .collect()
}

fn summarize(values: &[f64]) -> Option<SummaryStats> {
    let (min, max) = min_max(values)?;
    Some(SummaryStats {
        mean: round4(mean(values)?),
        std: sample_std(values).map(round4),
        min: round4(min),
        max: round4(max),
    })
}

fn range(values: &[f64]) -> Option<RangeStats> {
    let (min, max) = min_max(values)?;
    Some(RangeStats {
        mean: round4(mean(values)?),
        min: round4(min),
        max: round4(max),
    })
}
