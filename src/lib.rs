//! Time-series viewer with a rolling correlation overlay.
//!
//! The library holds everything that does not need a window: loading and
//! filtering datasets, the correlation engine, the chart description and the
//! application state. The `corrview` binary adds the egui front end; the
//! `corr_scan` and `generate_sample` binaries are headless.

pub mod analysis;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
