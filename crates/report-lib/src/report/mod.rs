//! Report pipeline: fetch, shape, aggregate
//!
//! The pipeline is strictly linear - one range query per metric per
//! container, issued sequentially. A query that returns nothing (or
//! fails) simply contributes no chart series and no summary row.

pub mod render;
pub mod stats;


use crate::models::{MetricSeries, QueryBackend, ReportConfig, ReportData, SeriesData};
use crate::prom::PrometheusClient;
use chrono::{TimeZone, Utc};

/// Window for rate() derivatives
const RATE_WINDOW: &str = "30s";

/// Fetches series and assembles the report data structure
pub struct ReportBuilder {
    client: PrometheusClient,
    config: ReportConfig,
}

impl ReportBuilder {
    pub fn new(client: PrometheusClient, config: ReportConfig) -> Self {
        Self { client, config }
    }

    /// Run the fetch and aggregation phases
    pub async fn build(&self) -> ReportData {
        let range = &self.config.range;
        let mut data = ReportData {
            title: self.config.title.clone(),
            start_time: range.start.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            end_time: range.end.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            duration_minutes: range.duration_minutes(),
            ..Default::default()
        };

        for container in &self.config.containers {
            let full_name = self.full_container_name(container);

            if let Some(series) = self.container_cpu(&full_name).await {
                if data.time_labels.is_empty() {
                    data.time_labels = time_labels(&series.timestamps);
                }
                data.cpu_series.push(series_data(&series, 2));
            }

            if let Some(series) = self.container_memory(&full_name).await {
                data.memory_series.push(series_data(&series, 1));
            }

            // cAdvisor network and filesystem metrics are keyed by the
            // container name label, which only exists outside the
            // cluster backend.
            if !self.config.backend.is_kubernetes() {
                if let Some(series) = self
                    .container_rate(&full_name, "container_network_receive_bytes_total")
                    .await
                {
                    data.network_rx_series.push(series_data(&series, 1));
                }
                if let Some(series) = self
                    .container_rate(&full_name, "container_network_transmit_bytes_total")
                    .await
                {
                    data.network_tx_series.push(series_data(&series, 1));
                }
                if let Some(series) = self
                    .container_rate(&full_name, "container_fs_reads_bytes_total")
                    .await
                {
                    data.fs_read_series.push(series_data(&series, 1));
                }
                if let Some(series) = self
                    .container_rate(&full_name, "container_fs_writes_bytes_total")
                    .await
                {
                    data.fs_write_series.push(series_data(&series, 1));
                }
            }
        }

        for expr in &self.config.rate_of_metrics {
            if let Some(series) = self.metric_rate(expr).await {
                data.rate_series.push(series_data(&series, 1));
            }
        }

        for expr in &self.config.total_of_metrics {
            if let Some(series) = self.metric_total(expr).await {
                data.total_series.push(series_data(&series, 1));
            }
        }

        data.metrics_table = stats::summary_table(&data, range.duration_secs());
        data
    }

    /// Expand a short container name into the full orchestration name
    fn full_container_name(&self, name: &str) -> String {
        if self.config.backend.is_kubernetes() || name.starts_with(&self.config.name_prefix) {
            name.to_string()
        } else {
            format!(
                "{}{}{}",
                self.config.name_prefix, name, self.config.name_suffix
            )
        }
    }

    /// Strip the orchestration prefix/suffix back off for display
    fn display_name(&self, full_name: &str) -> String {
        let name = full_name
            .strip_prefix(&self.config.name_prefix)
            .unwrap_or(full_name);
        let name = name.strip_suffix(&self.config.name_suffix).unwrap_or(name);
        name.to_string()
    }

    /// Issue one query and keep the first series, renamed for display
    async fn fetch_one(&self, query: String, display: &str) -> Option<MetricSeries> {
        let mut list = self.client.query_range(&query, &self.config.range).await;
        if list.is_empty() {
            return None;
        }
        let mut series = list.swap_remove(0);
        series.name = display.to_string();
        Some(series)
    }

    /// CPU usage percentage for a container
    async fn container_cpu(&self, full_name: &str) -> Option<MetricSeries> {
        let query = match &self.config.backend {
            QueryBackend::Kubernetes { namespace, .. } => format!(
                "sum(rate(container_cpu_usage_seconds_total{{namespace=\"{}\", pod=~\"{}{}.*\", container!=\"\"}}[{}]))*100",
                namespace, self.config.name_prefix, full_name, RATE_WINDOW
            ),
            _ => format!(
                "sum(rate(container_cpu_usage_seconds_total{{name=\"{}\"}}[{}]))*100",
                full_name, RATE_WINDOW
            ),
        };
        self.fetch_one(query, &self.display_name(full_name)).await
    }

    /// Memory usage in MB for a container
    async fn container_memory(&self, full_name: &str) -> Option<MetricSeries> {
        let query = match &self.config.backend {
            QueryBackend::Kubernetes { namespace, .. } => format!(
                "sum(container_memory_usage_bytes{{namespace=\"{}\", pod=~\"{}{}.*\", container!=\"\"}})/1024/1024",
                namespace, self.config.name_prefix, full_name
            ),
            _ => format!(
                "sum(container_memory_usage_bytes{{name=\"{}\"}})/1024/1024",
                full_name
            ),
        };
        self.fetch_one(query, &self.display_name(full_name)).await
    }

    /// Windowed byte rate of a per-container cAdvisor counter
    async fn container_rate(&self, full_name: &str, metric: &str) -> Option<MetricSeries> {
        let query = format!(
            "sum(rate({}{{name=\"{}\"}}[{}]))",
            metric, full_name, RATE_WINDOW
        );
        self.fetch_one(query, &self.display_name(full_name)).await
    }

    /// Windowed rate of a user-declared metric expression
    async fn metric_rate(&self, expr: &str) -> Option<MetricSeries> {
        let query = format!("sum(rate({}[{}]))", expr, RATE_WINDOW);
        self.fetch_one(query, expr).await
    }

    /// Instantaneous sum of a user-declared metric expression
    async fn metric_total(&self, expr: &str) -> Option<MetricSeries> {
        let query = format!("sum({})", expr);
        self.fetch_one(query, expr).await
    }
}

fn series_data(series: &MetricSeries, decimals: u32) -> SeriesData {
    SeriesData {
        name: series.name.clone(),
        values: series
            .values
            .iter()
            .map(|v| stats::round_to(*v, decimals))
            .collect(),
    }
}

/// Convert sample timestamps to MM:SS labels
fn time_labels(timestamps: &[f64]) -> Vec<String> {
    timestamps
        .iter()
        .map(|ts| {
            Utc.timestamp_opt(*ts as i64, 0)
                .single()
                .map(|dt| dt.format("%M:%S").to_string())
                .unwrap_or_default()
        })
        .collect()
}
