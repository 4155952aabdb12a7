//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs the analysis pipeline
//! - prints reports, saves charts, writes exports
//! - opens the terminal viewer

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalyzeArgs, Command, DataArgs, PlotArgs};
use crate::domain::{AnalysisConfig, ChartFormat, DataSource, SampleConfig};
use crate::error::AppError;
use crate::plot::AnyChart;

pub mod pipeline;

/// Entry point for the `infl` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal; CLI flags and the environment still apply.
    let _ = dotenvy::dotenv();
    init_tracing();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::View(args) => handle_view(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr so stdout reports and the terminal viewer stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run));

    if let Some(dir) = &config.charts_dir {
        let saved = crate::plot::save_all_charts(&run, dir, config.chart_format)?;
        for path in saved {
            println!("Saved chart: {}", path.display());
        }
    }
    if let Some(path) = &config.export_combined {
        crate::io::export::write_combined_csv(path, &run.combined)?;
        println!("Exported combined frame: {}", path.display());
    }
    if let Some(path) = &config.export_summary {
        crate::io::export::write_summary_json(path, &run)?;
        println!("Exported summary: {}", path.display());
    }

    Ok(())
}

fn handle_view(args: DataArgs) -> Result<(), AppError> {
    let config = data_config(&args)?;
    let run = pipeline::run_analysis(&config)?;
    crate::tui::run_viewer(&run, AnyChart::all(&run))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = data_config(&args.data)?;
    let run = pipeline::run_analysis(&config)?;
    crate::plot::plot_chart(&run, args.chart, args.output.as_deref())?;
    if let Some(path) = &args.output {
        println!("Saved chart: {}", path.display());
    }
    Ok(())
}

pub fn config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    let mut config = data_config(&args.data)?;
    config.charts_dir = args.charts_dir.clone();
    config.chart_format = args.chart_format;
    config.export_combined = args.export.clone();
    config.export_summary = args.export_summary.clone();
    Ok(config)
}

fn data_config(args: &DataArgs) -> Result<AnalysisConfig, AppError> {
    if args.window < 2 {
        return Err(AppError::Config(format!(
            "Rolling window must be at least 2 (got {}).",
            args.window
        )));
    }

    let source = if args.sample {
        DataSource::Sample(SampleConfig {
            seed: args.seed,
            months: args.months,
            ..SampleConfig::default()
        })
    } else {
        DataSource::Files {
            inflation_path: args.inflation.clone(),
            prices_path: args.prices.clone(),
        }
    };

    Ok(AnalysisConfig {
        source,
        price_column: args.price_column.to_lowercase(),
        window: args.window,
        correlate: (args.correlate_x, args.correlate_y),
        charts_dir: None,
        chart_format: ChartFormat::Png,
        export_combined: None,
        export_summary: None,
    })
}

/// Rewrite argv so `infl` defaults to `infl analyze`.
///
/// Rules:
/// - `infl`                      -> `infl analyze`
/// - `infl --sample ...`         -> `infl analyze --sample ...`
/// - `infl --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_analyze() {
        assert_eq!(rewrite_args(argv(&["infl"])), argv(&["infl", "analyze"]));
        assert_eq!(
            rewrite_args(argv(&["infl", "--sample", "-w", "12"])),
            argv(&["infl", "analyze", "--sample", "-w", "12"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["infl", "view"])), argv(&["infl", "view"]));
        assert_eq!(rewrite_args(argv(&["infl", "--help"])), argv(&["infl", "--help"]));
    }

    #[test]
    fn config_carries_outputs_and_sample_source() {
        let cli = crate::cli::Cli::parse_from(argv(&[
            "infl",
            "analyze",
            "--sample",
            "--seed",
            "9",
            "--months",
            "36",
            "--price-column",
            "Close",
            "--charts-dir",
            "out",
            "--chart-format",
            "svg",
            "--export",
            "combined.csv",
        ]));
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let config = config_from_args(&args).unwrap();

        assert_eq!(config.price_column, "close");
        assert_eq!(config.chart_format, ChartFormat::Svg);
        assert_eq!(config.export_combined.as_deref(), Some(std::path::Path::new("combined.csv")));
        assert!(config.export_summary.is_none());
        match config.source {
            DataSource::Sample(sample) => {
                assert_eq!(sample.seed, 9);
                assert_eq!(sample.months, 36);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn tiny_window_is_a_config_error() {
        let cli = crate::cli::Cli::parse_from(argv(&["infl", "analyze", "--sample", "-w", "1"]));
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let err = config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
