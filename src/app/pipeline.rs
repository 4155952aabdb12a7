//! Shared analysis pipeline used by both the `analyze` report and the
//! terminal viewer.
//!
//! load (files or synthetic sample) -> monthly returns -> alignment ->
//! combined frame -> rolling correlation -> regime table -> metrics
//!
//! The front-ends only deal with presentation (printing vs widgets).

use tracing::info;

use crate::calc;
use crate::data::generate_sample;
use crate::domain::{
    AnalysisConfig, AnnualizedMetrics, CombinedRecord, DataSource, InflationSeries, PriceSeries, RecordField,
    RegimeStats, ReturnSeries, RollingPoint,
};
use crate::error::AppError;
use crate::io::ingest::{load_all, resample_monthly};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    /// Human-readable description of where the data came from.
    pub source_label: String,
    pub inflation: InflationSeries,
    pub daily_prices: PriceSeries,
    pub monthly_prices: PriceSeries,
    pub returns: ReturnSeries,
    pub combined: Vec<CombinedRecord>,
    pub correlate: (RecordField, RecordField),
    pub window: usize,
    pub correlation: Vec<RollingPoint>,
    pub regime_stats: Vec<RegimeStats>,
    pub nominal_metrics: Option<AnnualizedMetrics>,
    pub real_metrics: Option<AnnualizedMetrics>,
}

impl AnalysisRun {
    /// Number of positions with a defined rolling correlation.
    pub fn defined_correlations(&self) -> usize {
        self.correlation.iter().filter(|p| p.value.is_some()).count()
    }
}

/// Load the configured data source and run the full analysis.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisRun, AppError> {
    match &config.source {
        DataSource::Files {
            inflation_path,
            prices_path,
        } => {
            let loaded = load_all(inflation_path, prices_path, &config.price_column)?;
            let label = format!("{} + {}", inflation_path.display(), prices_path.display());
            analyze_loaded(config, label, loaded.inflation, loaded.daily_prices, loaded.monthly_prices)
        }
        DataSource::Sample(sample_config) => {
            let sample = generate_sample(sample_config)?;
            let label = format!("synthetic sample (seed {}, {} months)", sample_config.seed, sample_config.months);
            run_analysis_with_data(config, label, sample.inflation, sample.prices)
        }
    }
}

/// Run the analysis on already-loaded series.
///
/// `daily_prices` is resampled to month-end on `config.price_column`.
pub fn run_analysis_with_data(
    config: &AnalysisConfig,
    source_label: impl Into<String>,
    inflation: InflationSeries,
    daily_prices: PriceSeries,
) -> Result<AnalysisRun, AppError> {
    let monthly_prices = resample_monthly(&daily_prices, &config.price_column)?;
    analyze_loaded(config, source_label.into(), inflation, daily_prices, monthly_prices)
}

fn analyze_loaded(
    config: &AnalysisConfig,
    source_label: String,
    inflation: InflationSeries,
    daily_prices: PriceSeries,
    monthly_prices: PriceSeries,
) -> Result<AnalysisRun, AppError> {
    let returns = calc::calculate_returns(&monthly_prices, &config.price_column)?;
    info!(
        inflation = inflation.len(),
        monthly_prices = monthly_prices.len(),
        returns = returns.len(),
        "data loaded"
    );

    let aligned = calc::align_data(&inflation, &returns);
    if aligned.is_empty() {
        return Err(AppError::NoOverlap);
    }

    let combined = calc::build_combined(&aligned);
    info!(
        months = combined.len(),
        start = %combined[0].date,
        end = %combined[combined.len() - 1].date,
        "aligned inflation and returns"
    );

    let (a, b) = config.correlate;
    let correlation = calc::rolling_correlation_series(&combined, a, b, config.window)?;
    let regime_stats = calc::analyze_by_regime(&combined);

    let nominal: Vec<f64> = combined.iter().map(|r| r.nominal_return).collect();
    let real: Vec<f64> = combined.iter().map(|r| r.real_return).collect();
    let nominal_metrics = calc::annualized_metrics(&nominal);
    let real_metrics = calc::annualized_metrics(&real);

    let run = AnalysisRun {
        source_label,
        inflation,
        daily_prices,
        monthly_prices,
        returns,
        combined,
        correlate: config.correlate,
        window: config.window,
        correlation,
        regime_stats,
        nominal_metrics,
        real_metrics,
    };
    info!(
        regimes = run.regime_stats.len(),
        correlations = run.defined_correlations(),
        "analysis complete"
    );
    Ok(run)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{ChartFormat, DEFAULT_PRICE_COLUMN, Observation, PriceRow, SampleConfig};

    fn config(source: DataSource, window: usize) -> AnalysisConfig {
        AnalysisConfig {
            source,
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            window,
            correlate: (RecordField::InflationRate, RecordField::NominalReturn),
            charts_dir: None,
            chart_format: ChartFormat::Png,
            export_combined: None,
            export_summary: None,
        }
    }

    #[test]
    fn sample_run_produces_consistent_outputs() {
        let cfg = config(
            DataSource::Sample(SampleConfig {
                seed: 3,
                months: 48,
                start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            }),
            12,
        );
        let run = run_analysis(&cfg).unwrap();

        // First month has no return, so 47 aligned months.
        assert_eq!(run.combined.len(), 47);
        assert_eq!(run.correlation.len(), run.combined.len());
        assert_eq!(run.defined_correlations(), 47 - 11);
        assert!(run.nominal_metrics.is_some());
        assert_eq!(
            run.regime_stats.iter().map(|s| s.count).sum::<usize>(),
            run.combined.len()
        );
    }

    #[test]
    fn month_without_prices_keeps_its_inflation_row() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let inflation = InflationSeries::new(
            "Inflation_Rate",
            vec![
                Observation::new(d(2023, 1, 12), 0.064),
                Observation::new(d(2023, 2, 14), 0.060),
                Observation::new(d(2023, 3, 14), 0.050),
            ],
        );
        let prices = PriceSeries {
            columns: vec!["close".to_string()],
            rows: [(2022, 12, 100.0), (2023, 1, 104.0), (2023, 3, 102.96)]
                .iter()
                .map(|&(y, m, close)| PriceRow {
                    date: d(y, m, 15),
                    values: vec![Some(close)],
                })
                .collect(),
        };

        let cfg = config(DataSource::Sample(SampleConfig::default()), 2);
        let run = run_analysis_with_data(&cfg, "gap", inflation, prices).unwrap();

        assert_eq!(run.monthly_prices.len(), 4);
        let dates: Vec<NaiveDate> = run.combined.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2023, 1, 31), d(2023, 2, 28), d(2023, 3, 31)]);
        assert_eq!(run.combined[1].nominal_return, 0.0);
        assert!((run.combined[2].nominal_return + 0.01).abs() < 1e-12);
    }

    #[test]
    fn disjoint_dates_report_no_overlap() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let inflation = InflationSeries::new(
            "Inflation_Rate",
            vec![Observation::new(d(2001, 1, 15), 0.02), Observation::new(d(2001, 2, 15), 0.02)],
        );
        let prices = PriceSeries {
            columns: vec!["close".to_string()],
            rows: [(2020, 1), (2020, 2), (2020, 3)]
                .iter()
                .map(|&(y, m)| PriceRow {
                    date: d(y, m, 10),
                    values: vec![Some(100.0 + m as f64)],
                })
                .collect(),
        };

        let cfg = config(DataSource::Sample(SampleConfig::default()), 60);
        let err = run_analysis_with_data(&cfg, "test", inflation, prices).unwrap_err();
        assert!(matches!(err, AppError::NoOverlap));
        assert_eq!(err.exit_code(), 3);
    }
}
