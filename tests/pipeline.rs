use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use inflation_returns::app::pipeline::{AnalysisRun, run_analysis};
use inflation_returns::domain::{AnalysisConfig, ChartFormat, DataSource, InflationRegime, RecordField};
use inflation_returns::error::AppError;
use inflation_returns::io::{write_combined_csv, write_summary_json};
use inflation_returns::plot::{AnyChart, ChartKind, plot_inflation_regimes, save_all_charts, save_chart};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("infl-it-{}-{tag}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(window: usize) -> AnalysisConfig {
    AnalysisConfig {
        source: DataSource::Files {
            inflation_path: fixture("cpi.csv"),
            prices_path: fixture("prices.csv"),
        },
        price_column: "close".to_string(),
        window,
        correlate: (RecordField::InflationRate, RecordField::NominalReturn),
        charts_dir: None,
        chart_format: ChartFormat::Svg,
        export_combined: None,
        export_summary: None,
    }
}

fn fixture_run() -> AnalysisRun {
    run_analysis(&config(24)).unwrap()
}

#[test]
fn fixture_pipeline_aligns_every_month_after_the_first() {
    let run = fixture_run();

    assert_eq!(run.inflation.len(), 72);
    assert_eq!(run.monthly_prices.len(), 72);
    assert_eq!(run.returns.len(), 71);
    assert_eq!(run.combined.len(), 71);
    assert_eq!(run.combined[0].date, NaiveDate::from_ymd_opt(2015, 2, 28).unwrap());
    assert_eq!(run.combined[70].date, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
    assert!(run.combined.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn derived_columns_are_consistent() {
    let run = fixture_run();

    for r in &run.combined {
        assert!((r.real_return - (r.nominal_return - r.inflation_rate)).abs() < 1e-12);
    }

    let mut growth = 1.0;
    for r in &run.combined {
        growth *= 1.0 + r.nominal_return;
        assert!((r.cumulative_nominal - (growth - 1.0)).abs() < 1e-9);
    }

    let counted: usize = run.regime_stats.iter().map(|s| s.count).sum();
    assert_eq!(counted, run.combined.len());
    let regimes: Vec<InflationRegime> = run.regime_stats.iter().map(|s| s.regime).collect();
    assert_eq!(regimes, InflationRegime::ALL.to_vec());
}

#[test]
fn rolling_correlation_is_defined_after_a_full_window() {
    let run = fixture_run();

    assert_eq!(run.correlation.len(), run.combined.len());
    assert!(run.correlation[..23].iter().all(|p| p.value.is_none()));
    let defined: Vec<f64> = run.correlation[23..].iter().filter_map(|p| p.value).collect();
    assert_eq!(defined.len(), run.combined.len() - 23);
    assert!(defined.iter().all(|v| (-1.0..=1.0).contains(v)));
}

#[test]
fn default_window_longer_than_history_leaves_correlation_undefined() {
    let run = run_analysis(&config(120)).unwrap();
    assert!(run.correlation.iter().all(|p| p.value.is_none()));
    assert!(run.nominal_metrics.is_some());
}

#[test]
fn exports_write_csv_and_json() {
    let run = fixture_run();
    let dir = scratch_dir("exports");

    let csv_path = dir.join("combined.csv");
    write_combined_csv(&csv_path, &run.combined).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), run.combined.len() + 1);
    assert!(text.starts_with("Date,Inflation_Rate,Nominal_Return,Real_Return"));

    let json_path = dir.join("summary.json");
    write_summary_json(&json_path, &run).unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["months"], 71);
    assert_eq!(value["window"], 24);
    assert!(value["nominal_metrics"]["Sharpe_Ratio"].is_number());
    assert_eq!(value["regimes"].as_array().unwrap().len(), 3);
    assert_eq!(value["rolling_correlation"][0]["value"], serde_json::Value::Null);
}

#[test]
fn all_charts_render_to_svg_and_png() {
    let run = fixture_run();

    for format in [ChartFormat::Svg, ChartFormat::Png] {
        let dir = scratch_dir(format.extension());
        let saved = save_all_charts(&run, &dir, format).unwrap();
        assert_eq!(saved.len(), 4);
        for path in &saved {
            let bytes = std::fs::read(path).unwrap();
            assert!(!bytes.is_empty(), "{} is empty", path.display());
            if format == ChartFormat::Png {
                assert_eq!(&bytes[1..4], b"PNG");
            }
        }
    }

    let svg = std::fs::read_to_string(scratch_dir("svg").join("inflation_regimes.svg")).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn single_chart_save_picks_backend_from_extension() {
    let run = fixture_run();
    let dir = scratch_dir("single");

    let path = save_chart(&AnyChart::build(ChartKind::Correlation, &run), &dir.join("nested/corr.svg")).unwrap();
    assert!(std::fs::read_to_string(path).unwrap().contains("<svg"));
}

#[test]
fn labelled_png_renders_through_the_plot_entry_point() {
    let run = fixture_run();
    let path = scratch_dir("png").join("regimes.png");

    plot_inflation_regimes(&run, Some(&path)).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn missing_input_file_is_reported() {
    let mut cfg = config(24);
    cfg.source = DataSource::Files {
        inflation_path: fixture("does-not-exist.csv"),
        prices_path: fixture("prices.csv"),
    };
    let err = run_analysis(&cfg).unwrap_err();
    assert!(matches!(err, AppError::FileNotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unknown_price_column_is_a_schema_error() {
    let mut cfg = config(24);
    cfg.price_column = "adj_close".to_string();
    let err = run_analysis(&cfg).unwrap_err();
    assert!(matches!(err, AppError::Schema { .. }));
}
