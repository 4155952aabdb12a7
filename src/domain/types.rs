//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages by value (no shared mutable frames)
//! - exported to CSV/JSON
//! - handed to the chart renderers as read-only slices

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default trailing window (months) for rolling correlation.
pub const DEFAULT_ROLLING_WINDOW: usize = 60;

/// Default price column used for monthly returns.
pub const DEFAULT_PRICE_COLUMN: &str = "close";

/// One `(date, value)` point of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An ordered sequence of observations for a single named quantity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<Observation>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, points: Vec<Observation>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Annualized YoY inflation rates (decimals, e.g. `0.025` = 2.5%).
pub type InflationSeries = TimeSeries;

/// Simple periodic returns (decimals).
pub type ReturnSeries = TimeSeries;

/// Canonical name of the inflation value column (`Actual` in the source file).
pub const INFLATION_RATE: &str = "Inflation_Rate";

/// Canonical name of the nominal return series.
pub const NOMINAL_RETURN: &str = "Nominal_Return";

/// One dated row of a price table. `values[i]` belongs to `PriceSeries::columns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// A price table keyed by date with lower-cased column names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    pub columns: Vec<String>,
    pub rows: Vec<PriceRow>,
}

impl PriceSeries {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = column.trim().to_ascii_lowercase();
        self.columns.iter().position(|c| *c == wanted)
    }

    /// Non-missing values of one column, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<Observation>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| {
                    row.values
                        .get(idx)
                        .copied()
                        .flatten()
                        .map(|v| Observation::new(row.date, v))
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}

/// Inflation regime bucket.
///
/// Thresholds are fixed at 1% and 3% annual inflation (decimal `0.01` / `0.03`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InflationRegime {
    #[serde(rename = "Low (<1%)")]
    Low,
    #[serde(rename = "Moderate (1-3%)")]
    Moderate,
    #[serde(rename = "High (>3%)")]
    High,
}

impl InflationRegime {
    pub const ALL: [InflationRegime; 3] = [
        InflationRegime::Low,
        InflationRegime::Moderate,
        InflationRegime::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InflationRegime::Low => "Low (<1%)",
            InflationRegime::Moderate => "Moderate (1-3%)",
            InflationRegime::High => "High (>3%)",
        }
    }

    /// Position in the `Low → Moderate → High` order (chart slots).
    pub fn index(self) -> usize {
        match self {
            InflationRegime::Low => 0,
            InflationRegime::Moderate => 1,
            InflationRegime::High => 2,
        }
    }
}

impl fmt::Display for InflationRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A month-end row present in both the inflation and return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    pub inflation_rate: f64,
    pub nominal_return: f64,
}

/// Fully derived month-end record.
///
/// Field names serialize to the column names of the exported combined frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Inflation_Rate")]
    pub inflation_rate: f64,
    #[serde(rename = "Nominal_Return")]
    pub nominal_return: f64,
    #[serde(rename = "Real_Return")]
    pub real_return: f64,
    #[serde(rename = "Cumulative_Nominal")]
    pub cumulative_nominal: f64,
    #[serde(rename = "Cumulative_Real")]
    pub cumulative_real: f64,
    #[serde(rename = "Inflation_Regime")]
    pub regime: InflationRegime,
}

/// Numeric columns of a `CombinedRecord` that can feed rolling statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    InflationRate,
    NominalReturn,
    RealReturn,
    CumulativeNominal,
    CumulativeReal,
}

impl RecordField {
    pub fn column_name(self) -> &'static str {
        match self {
            RecordField::InflationRate => "Inflation_Rate",
            RecordField::NominalReturn => "Nominal_Return",
            RecordField::RealReturn => "Real_Return",
            RecordField::CumulativeNominal => "Cumulative_Nominal",
            RecordField::CumulativeReal => "Cumulative_Real",
        }
    }
}

impl CombinedRecord {
    pub fn field(&self, field: RecordField) -> f64 {
        match field {
            RecordField::InflationRate => self.inflation_rate,
            RecordField::NominalReturn => self.nominal_return,
            RecordField::RealReturn => self.real_return,
            RecordField::CumulativeNominal => self.cumulative_nominal,
            RecordField::CumulativeReal => self.cumulative_real,
        }
    }
}

/// One point of a rolling statistic; `None` until the window is full
/// (or when the window is degenerate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Summary statistics of one column within a regime.
///
/// `std` is the sample standard deviation and is `None` for a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Range statistics (no dispersion) of one column within a regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-regime statistics, rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeStats {
    pub regime: InflationRegime,
    pub count: usize,
    pub nominal_return: SummaryStats,
    pub real_return: SummaryStats,
    pub inflation_rate: RangeStats,
}

/// Annualized return/risk summary of a monthly return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualizedMetrics {
    #[serde(rename = "Annualized_Return")]
    pub annualized_return: f64,
    #[serde(rename = "Annualized_Volatility")]
    pub annualized_volatility: f64,
    #[serde(rename = "Sharpe_Ratio")]
    pub sharpe_ratio: f64,
}

/// Output format for saved charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

/// Where the input series come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Inflation + price CSV files.
    Files {
        inflation_path: PathBuf,
        prices_path: PathBuf,
    },
    /// Reproducible synthetic data (see `data::sample`).
    Sample(SampleConfig),
}

/// Synthetic sample generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub seed: u64,
    pub months: usize,
    pub start: NaiveDate,
}

/// Resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub source: DataSource,
    pub price_column: String,
    pub window: usize,
    pub correlate: (RecordField, RecordField),
    pub charts_dir: Option<PathBuf>,
    pub chart_format: ChartFormat,
    pub export_combined: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn price_column_lookup_is_case_insensitive_and_skips_missing() {
        let prices = PriceSeries {
            columns: vec!["open".to_string(), "close".to_string()],
            rows: vec![
                PriceRow { date: d(2020, 1, 2), values: vec![Some(1.0), Some(2.0)] },
                PriceRow { date: d(2020, 1, 3), values: vec![Some(1.5), None] },
            ],
        };

        assert_eq!(prices.column_index("Close"), Some(1));
        let close = prices.column("CLOSE").unwrap();
        assert_eq!(close, vec![Observation::new(d(2020, 1, 2), 2.0)]);
        assert!(prices.column("volume").is_none());
    }

    #[test]
    fn regime_labels_serialize_with_thresholds() {
        let json = serde_json::to_string(&InflationRegime::Moderate).unwrap();
        assert_eq!(json, "\"Moderate (1-3%)\"");
        assert_eq!(InflationRegime::High.to_string(), "High (>3%)");
    }

    #[test]
    fn metrics_serialize_with_canonical_keys() {
        let m = AnnualizedMetrics {
            annualized_return: 0.1,
            annualized_volatility: 0.2,
            sharpe_ratio: 0.5,
        };
        let v = serde_json::to_value(m).unwrap();
        assert!(v.get("Annualized_Return").is_some());
        assert!(v.get("Annualized_Volatility").is_some());
        assert!(v.get("Sharpe_Ratio").is_some());
    }
}
