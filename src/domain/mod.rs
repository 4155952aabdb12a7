//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input series (`TimeSeries`, `PriceSeries`)
//! - derived rows (`AlignedPoint`, `CombinedRecord`, `RollingPoint`)
//! - summaries (`RegimeStats`, `AnnualizedMetrics`)
//! - run configuration (`AnalysisConfig`, `SampleConfig`)

pub mod types;

pub use types::*;
