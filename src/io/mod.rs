//! Input/output helpers.
//!
//! - CSV ingest + month-end resampling (`ingest`)
//! - result exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
