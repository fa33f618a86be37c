//! Performance report generator
//!
//! Queries Prometheus range data for a set of containers and metric
//! expressions, aggregates summary statistics, and renders a single
//! static HTML report.
//!
//! Example:
//!   perf-report \
//!       --start 2025-12-20T20:12:00Z \
//!       --end 2025-12-20T20:22:00Z \
//!       --containers oracle,olr \
//!       --rate-of 'dml_ops{filter="out"}' \
//!       --total-of bytes_sent \
//!       --output reports/performance/test/charts.html

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::Parser;
use colored::Colorize;
use report_lib::{
    render_report, PrometheusClient, QueryBackend, ReportBuilder, ReportConfig, TimeRange,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Generate an HTML performance report from Prometheus metrics
#[derive(Parser)]
#[command(name = "perf-report", author, version, about, long_about = None)]
struct Cli {
    /// Start time (ISO format, e.g. 2025-12-20T20:12:00Z)
    #[arg(long)]
    start: String,

    /// End time (ISO format)
    #[arg(long)]
    end: String,

    /// Comma-separated list of container names
    #[arg(long)]
    containers: String,

    /// Metric expression charted as a windowed rate (repeatable)
    #[arg(long = "rate-of")]
    rate_of: Vec<String>,

    /// Metric expression charted as a raw total (repeatable)
    #[arg(long = "total-of")]
    total_of: Vec<String>,

    /// Prometheus URL as reachable from the query transport
    #[arg(long, env = "PROMETHEUS_URL", default_value = "http://prometheus:9090")]
    prometheus: String,

    /// Output HTML file path
    #[arg(long)]
    output: PathBuf,

    /// Report title
    #[arg(long, default_value = "Performance Test Report")]
    title: String,

    /// Query step in seconds
    #[arg(long, default_value_t = 30)]
    step: u64,

    /// Docker Compose service to exec into for queries
    #[arg(long, default_value = "prometheus")]
    service: String,

    /// Query via kubectl exec instead of docker compose
    #[arg(long)]
    k8s: bool,

    /// Kubernetes namespace
    #[arg(long, default_value = "monitoring")]
    k8s_namespace: String,

    /// Kubernetes deployment to exec into
    #[arg(long, default_value = "prometheus-server")]
    k8s_deployment: String,

    /// Query the Prometheus URL directly instead of via remote exec
    #[arg(long, conflicts_with = "k8s")]
    direct: bool,

    /// Orchestration prefix used to expand and display container names
    #[arg(long, default_value = "")]
    name_prefix: String,

    /// Matching container name suffix
    #[arg(long, default_value = "")]
    name_suffix: String,

    /// HTML template overriding the embedded one
    #[arg(long)]
    template: Option<PathBuf>,
}

impl Cli {
    fn backend(&self) -> QueryBackend {
        if self.direct {
            QueryBackend::Direct
        } else if self.k8s {
            QueryBackend::Kubernetes {
                namespace: self.k8s_namespace.clone(),
                deployment: self.k8s_deployment.clone(),
            }
        } else {
            QueryBackend::Compose {
                service: self.service.clone(),
            }
        }
    }

    fn report_config(&self) -> Result<ReportConfig> {
        let range = TimeRange::new(
            parse_instant(&self.start)?,
            parse_instant(&self.end)?,
            self.step,
        )?;

        Ok(ReportConfig {
            range,
            prometheus_url: self.prometheus.clone(),
            containers: self
                .containers
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            rate_of_metrics: self.rate_of.clone(),
            total_of_metrics: self.total_of.clone(),
            title: self.title.clone(),
            backend: self.backend(),
            name_prefix: self.name_prefix.clone(),
            name_suffix: self.name_suffix.clone(),
        })
    }
}

/// Accepts RFC 3339 (`Z` suffix included) or a naive timestamp read
/// as UTC.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("invalid time `{}`", raw))?;
    Ok(naive.and_utc())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries only the result line.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.report_config()?;
    tracing::info!(
        containers = config.containers.len(),
        rate_metrics = config.rate_of_metrics.len(),
        total_metrics = config.total_of_metrics.len(),
        "Generating report"
    );

    let client = PrometheusClient::for_backend(&config.backend, &config.prometheus_url)?;
    let data = ReportBuilder::new(client, config).build().await;

    render_report(&data, cli.template.as_deref(), &cli.output)?;
    println!(
        "{} Report generated: {}",
        "✓".green().bold(),
        cli.output.display()
    );

    Ok(())
}
