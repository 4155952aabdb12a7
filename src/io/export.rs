//! Export analysis results.
//!
//! - the combined frame as CSV (easy to consume in spreadsheets)
//! - a JSON summary: regime table, annualized metrics and rolling correlation

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::pipeline::AnalysisRun;
use crate::domain::{AnnualizedMetrics, CombinedRecord, RegimeStats, RollingPoint};
use crate::error::AppError;

/// JSON summary document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFile {
    pub tool: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub months: usize,
    pub window: usize,
    pub correlation_fields: [String; 2],
    pub nominal_metrics: Option<AnnualizedMetrics>,
    pub real_metrics: Option<AnnualizedMetrics>,
    pub regimes: Vec<RegimeStats>,
    pub rolling_correlation: Vec<RollingPoint>,
}

impl SummaryFile {
    pub fn from_run(run: &AnalysisRun) -> Self {
        Self {
            tool: "infl".to_string(),
            start: run.combined.first().map(|r| r.date),
            end: run.combined.last().map(|r| r.date),
            months: run.combined.len(),
            window: run.window,
            correlation_fields: [
                run.correlate.0.column_name().to_string(),
                run.correlate.1.column_name().to_string(),
            ],
            nominal_metrics: run.nominal_metrics,
            real_metrics: run.real_metrics,
            regimes: run.regime_stats.clone(),
            rolling_correlation: run.correlation.clone(),
        }
    }
}

/// Write the combined frame to a CSV file.
pub fn write_combined_csv(path: &Path, records: &[CombinedRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| export_error(path, format!("Failed to create CSV: {e}")))?;
    let mut writer = csv::Writer::from_writer(file);

    for record in records {
        writer
            .serialize(record)
            .map_err(|e| export_error(path, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| export_error(path, format!("Failed to flush CSV: {e}")))?;

    info!(path = %path.display(), rows = records.len(), "exported combined frame");
    Ok(())
}

/// Write the JSON summary.
pub fn write_summary_json(path: &Path, run: &AnalysisRun) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| export_error(path, format!("Failed to create JSON: {e}")))?;

    serde_json::to_writer_pretty(file, &SummaryFile::from_run(run))
        .map_err(|e| export_error(path, format!("Failed to write JSON: {e}")))?;

    info!(path = %path.display(), "exported summary");
    Ok(())
}

fn export_error(path: &Path, message: String) -> AppError {
    AppError::Export {
        path: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InflationRegime;

    #[test]
    fn combined_csv_uses_frame_column_names() {
        let path = std::env::temp_dir().join(format!("infl-export-{}.csv", std::process::id()));
        let records = [CombinedRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            inflation_rate: 0.064,
            nominal_return: 0.0618,
            real_return: -0.0022,
            cumulative_nominal: 0.0618,
            cumulative_real: -0.0022,
            regime: InflationRegime::High,
        }];

        write_combined_csv(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Inflation_Rate,Nominal_Return,Real_Return,Cumulative_Nominal,Cumulative_Real,Inflation_Regime"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2023-01-31,0.064,"));
        assert!(row.ends_with(",High (>3%)"));
    }
}
