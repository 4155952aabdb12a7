//! Month-end date alignment and real returns.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{AlignedPoint, InflationSeries, Observation, ReturnSeries};

/// Snap a date to the last calendar day of its month.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let last_day = days_in_month(date.year(), date.month());
    date.with_day(last_day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Normalize observations to month-end keys, dropping non-finite values.
/// When a month holds several observations, the last one wins.
fn by_month_end(points: &[Observation]) -> BTreeMap<NaiveDate, f64> {
    points
        .iter()
        .filter(|p| p.value.is_finite())
        .map(|p| (month_end(p.date), p.value))
        .collect()
}

/// Inner-join inflation and returns on their month-end dates.
///
/// Inflation dates may fall mid-month; both sides are normalized before the
/// join. Dates present in only one series are excluded and nothing is
/// interpolated, so the result may be empty. Output dates are unique and
/// strictly increasing.
pub fn align_data(inflation: &InflationSeries, returns: &ReturnSeries) -> Vec<AlignedPoint> {
    let inflation = by_month_end(&inflation.points);
    let returns = by_month_end(&returns.points);

    inflation
        .iter()
        .filter_map(|(date, &inflation_rate)| {
            returns.get(date).map(|&nominal_return| AlignedPoint {
                date: *date,
                inflation_rate,
                nominal_return,
            })
        })
        .collect()
}

/// Real return approximation: `nominal - inflation`.
///
/// This is the additive approximation, not the exact `(1 + n) / (1 + i) - 1`
/// decomposition. Downstream figures are defined in terms of it.
pub fn real_return(nominal: f64, inflation: f64) -> f64 {
    nominal - inflation
}

/// Real returns for every aligned row, in order.
pub fn calculate_real_returns(aligned: &[AlignedPoint]) -> Vec<f64> {
    aligned
        .iter()
        .map(|p| real_return(p.nominal_return, p.inflation_rate))
        .collect()
}
