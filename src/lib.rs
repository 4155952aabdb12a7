//! `inflation-returns` library crate.
//!
//! The binary (`infl`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the calculation layer is reusable outside the CLI
//!
//! Data flows `io::ingest` -> `calc` -> `plot`/`report`, orchestrated by
//! `app::pipeline`.

pub mod app;
pub mod calc;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
