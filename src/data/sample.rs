//! Synthetic inflation/price sample generation.
//!
//! Produces a reproducible dataset shaped like the real inputs:
//! - monthly YoY inflation dated mid-month (like CPI release dates)
//! - business-day closing prices
//!
//! Inflation follows a mean-reverting AR(1) process; prices follow a
//! geometric random walk whose drift is dampened when inflation runs hot.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{INFLATION_RATE, InflationSeries, Observation, PriceRow, PriceSeries, SampleConfig};
use crate::error::AppError;

/// Long-run inflation level the AR(1) process reverts to.
const INFLATION_MEAN: f64 = 0.025;
/// Monthly persistence of inflation deviations.
const INFLATION_PERSISTENCE: f64 = 0.92;
/// Monthly shock size of inflation.
const INFLATION_SHOCK: f64 = 0.004;
/// Annual equity drift before the inflation drag.
const EQUITY_DRIFT: f64 = 0.08;
/// Annual equity volatility.
const EQUITY_VOL: f64 = 0.16;
/// Drift lost per unit of inflation above the long-run level.
const INFLATION_DRAG: f64 = 1.5;
const TRADING_DAYS: f64 = 252.0;
const START_PRICE: f64 = 1_000.0;
/// Longest sample we generate (100 years).
pub const MAX_SAMPLE_MONTHS: usize = 1_200;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub inflation: InflationSeries,
    pub prices: PriceSeries,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            months: 144,
            start: NaiveDate::from_ymd_opt(2012, 1, 1).unwrap_or_default(),
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.months < 2 {
        return Err(AppError::Config("Sample needs at least 2 months.".to_string()));
    }
    if config.months > MAX_SAMPLE_MONTHS {
        return Err(AppError::Config(format!(
            "Sample length {} exceeds the maximum of {MAX_SAMPLE_MONTHS} months.",
            config.months
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::Config(format!("Noise distribution error: {e}")))?;

    let first_month = config
        .start
        .with_day(1)
        .ok_or_else(|| AppError::Config("Invalid sample start date.".to_string()))?;

    let mut inflation_points = Vec::with_capacity(config.months);
    let mut price_rows = Vec::new();

    let mut inflation = INFLATION_MEAN;
    let mut price = START_PRICE;
    let dt = 1.0 / TRADING_DAYS;

    for m in 0..config.months {
        let month_start = first_month
            .checked_add_months(Months::new(m as u32))
            .ok_or_else(|| AppError::Config("Sample date range overflow.".to_string()))?;
        let next_month = month_start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::Config("Sample date range overflow.".to_string()))?;

        inflation = INFLATION_MEAN
            + INFLATION_PERSISTENCE * (inflation - INFLATION_MEAN)
            + INFLATION_SHOCK * standard.sample(&mut rng);
        let release = month_start + Duration::days(rng.gen_range(9..16));
        inflation_points.push(Observation::new(release, inflation));

        let drift = EQUITY_DRIFT - INFLATION_DRAG * (inflation - INFLATION_MEAN).max(0.0);
        let mut day = month_start;
        while day < next_month {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                let z = standard.sample(&mut rng);
                price *= ((drift - 0.5 * EQUITY_VOL * EQUITY_VOL) * dt + EQUITY_VOL * dt.sqrt() * z).exp();
                price_rows.push(PriceRow {
                    date: day,
                    values: vec![Some(price)],
                });
            }
            day += Duration::days(1);
        }
    }

    info!(
        seed = config.seed,
        months = config.months,
        trading_days = price_rows.len(),
        "generated synthetic sample"
    );

    Ok(SampleData {
        inflation: InflationSeries::new(INFLATION_RATE, inflation_points),
        prices: PriceSeries {
            columns: vec!["close".to_string()],
            rows: price_rows,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_reproducible_for_a_seed() {
        let config = SampleConfig::default();
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a.inflation, b.inflation);
        assert_eq!(a.prices, b.prices);

        let other = generate_sample(&SampleConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a.inflation, other.inflation);
    }

    #[test]
    fn sample_has_one_inflation_print_per_month_and_weekday_prices() {
        let config = SampleConfig {
            seed: 1,
            months: 24,
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        let sample = generate_sample(&config).unwrap();

        assert_eq!(sample.inflation.len(), 24);
        assert!(sample.inflation.points.iter().all(|p| (10..=16).contains(&p.date.day())));
        assert!(sample.prices.rows.iter().all(|r| !matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(sample.prices.rows.windows(2).all(|w| w[0].date < w[1].date));
        assert!(sample.prices.column("close").unwrap().iter().all(|o| o.value > 0.0));
    }

    #[test]
    fn too_short_sample_is_rejected() {
        let config = SampleConfig { months: 1, ..SampleConfig::default() };
        assert!(generate_sample(&config).is_err());
    }

    #[test]
    fn oversized_sample_is_a_config_error() {
        let config = SampleConfig { months: usize::MAX, ..SampleConfig::default() };
        let err = generate_sample(&config).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "{err}");
        assert_eq!(err.exit_code(), 2);

        let longest = SampleConfig { months: MAX_SAMPLE_MONTHS, ..SampleConfig::default() };
        assert_eq!(generate_sample(&longest).unwrap().inflation.len(), MAX_SAMPLE_MONTHS);
    }
}
