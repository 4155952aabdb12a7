//! Command-line parsing for the inflation vs equity returns analyzer.
//!
//! Argument parsing and command dispatch stay separate from the calculation
//! code; `crate::app` turns these structs into an `AnalysisConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartFormat, DEFAULT_PRICE_COLUMN, DEFAULT_ROLLING_WINDOW, RecordField};
use crate::plot::ChartKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "infl", version, about = "Inflation vs equity returns analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the analysis, print the report, and optionally save charts/exports.
    Analyze(AnalyzeArgs),
    /// Browse all charts in the terminal viewer.
    View(DataArgs),
    /// Render a single chart to a file, or show it in the terminal.
    Plot(PlotArgs),
}

/// Input data and analysis options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Inflation CSV (`Year, Month, Day, Actual`).
    #[arg(long, value_name = "CSV", env = "INFLATION_CSV", default_value = "data/raw/CPI.csv")]
    pub inflation: PathBuf,

    /// Price CSV (`Date` plus OHLC columns).
    #[arg(long, value_name = "CSV", env = "PRICES_CSV", default_value = "data/raw/SP500.csv")]
    pub prices: PathBuf,

    /// Price column used for returns (case-insensitive).
    #[arg(long, default_value = DEFAULT_PRICE_COLUMN)]
    pub price_column: String,

    /// Rolling correlation window in months.
    #[arg(short = 'w', long, default_value_t = DEFAULT_ROLLING_WINDOW)]
    pub window: usize,

    /// First field of the rolling correlation.
    #[arg(long, value_enum, default_value_t = RecordField::InflationRate)]
    pub correlate_x: RecordField,

    /// Second field of the rolling correlation.
    #[arg(long, value_enum, default_value_t = RecordField::NominalReturn)]
    pub correlate_y: RecordField,

    /// Use a reproducible synthetic dataset instead of the CSV files.
    #[arg(long)]
    pub sample: bool,

    /// Random seed for `--sample`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of months generated by `--sample`.
    #[arg(long, default_value_t = 144)]
    pub months: usize,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Save all four charts into this directory.
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Image format for `--charts-dir`.
    #[arg(long, value_enum, default_value_t = ChartFormat::Png)]
    pub chart_format: ChartFormat,

    /// Export the combined monthly frame to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export regime table, metrics and rolling correlation to JSON.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Which chart to render.
    #[arg(value_enum)]
    pub chart: ChartKind,

    /// Output file (`.svg` for SVG, otherwise PNG). Omit to view in the terminal.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub data: DataArgs,
}
