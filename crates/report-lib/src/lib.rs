//! Report generation library
//!
//! This crate provides the pieces of the report pipeline:
//! - Prometheus range-query access over direct HTTP or remote exec
//! - Series shaping and summary statistics
//! - HTML report rendering

pub mod models;
pub mod prom;
pub mod report;

pub use models::{
    MetricSeries, QueryBackend, ReportConfig, ReportData, SeriesData, SummaryRow, TimeRange,
};
pub use prom::PrometheusClient;
pub use report::{render::render_report, ReportBuilder};
