//! Core data models for report generation

use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive query interval with a sampling step
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step_secs: u64,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, step_secs: u64) -> Result<Self> {
        ensure!(start <= end, "range start {} is after end {}", start, end);
        ensure!(step_secs > 0, "step must be positive");
        Ok(Self {
            start,
            end,
            step_secs,
        })
    }

    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_seconds() / 60
    }
}

/// A time series of metric values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub timestamps: Vec<f64>,
    pub values: Vec<f64>,
}

/// How range queries reach the Prometheus endpoint
#[derive(Debug, Clone)]
pub enum QueryBackend {
    /// Direct HTTP from this process
    Direct,
    /// `docker compose exec` into a service that can reach the endpoint
    Compose { service: String },
    /// `kubectl exec` into a deployment inside the cluster
    Kubernetes {
        namespace: String,
        deployment: String,
    },
}

impl QueryBackend {
    pub fn is_kubernetes(&self) -> bool {
        matches!(self, QueryBackend::Kubernetes { .. })
    }
}

/// Immutable input describing one report run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub range: TimeRange,
    pub prometheus_url: String,
    pub containers: Vec<String>,
    pub rate_of_metrics: Vec<String>,
    pub total_of_metrics: Vec<String>,
    pub title: String,
    pub backend: QueryBackend,
    /// Orchestration prefix prepended when expanding short container
    /// names and stripped again for display.
    pub name_prefix: String,
    /// Matching suffix (for example a compose replica index)
    pub name_suffix: String,
}

/// One named series as consumed by the template
#[derive(Debug, Clone, Serialize)]
pub struct SeriesData {
    pub name: String,
    pub values: Vec<f64>,
}

/// One pre-formatted row of the summary table
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub min: String,
    pub avg: String,
    pub max: String,
    pub total: String,
}

/// Fully computed report structure handed to the template.
///
/// Field names are the template's placeholder keys; keep them stable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportData {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub time_labels: Vec<String>,
    pub cpu_series: Vec<SeriesData>,
    pub memory_series: Vec<SeriesData>,
    pub network_rx_series: Vec<SeriesData>,
    pub network_tx_series: Vec<SeriesData>,
    pub fs_read_series: Vec<SeriesData>,
    pub fs_write_series: Vec<SeriesData>,
    pub rate_series: Vec<SeriesData>,
    pub total_series: Vec<SeriesData>,
    pub metrics_table: Vec<SummaryRow>,
}
