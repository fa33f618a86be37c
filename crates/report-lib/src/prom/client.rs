//! Range-query client for the Prometheus HTTP API

use crate::models::{MetricSeries, QueryBackend, TimeRange};
use crate::prom::transport::{self, QueryTransport};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;
use url::Url;

/// Reserved label carrying the metric name
const NAME_LABEL: &str = "__name__";

/// Success marker in the response envelope
const SUCCESS_STATUS: &str = "success";

/// Characters of a malformed response body kept in diagnostics
const BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct RangeResponse {
    status: String,
    #[serde(default)]
    data: RangeData,
}

#[derive(Debug, Default, Deserialize)]
struct RangeData {
    #[serde(default)]
    result: Vec<RangeResult>,
}

#[derive(Debug, Deserialize)]
struct RangeResult {
    #[serde(default)]
    metric: HashMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

/// Client for querying Prometheus through a [`QueryTransport`]
pub struct PrometheusClient {
    transport: Box<dyn QueryTransport>,
    base_url: String,
}

impl PrometheusClient {
    pub fn new(transport: Box<dyn QueryTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Create a client with the transport selected by configuration
    pub fn for_backend(backend: &QueryBackend, base_url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(transport::for_backend(backend)?, base_url))
    }

    /// Execute a range query and return the metric series.
    ///
    /// Every failure mode (transport fault, malformed body, non-success
    /// envelope) is logged and yields an empty list so the run can
    /// continue with the remaining queries.
    pub async fn query_range(&self, query: &str, range: &TimeRange) -> Vec<MetricSeries> {
        let url = match self.range_url(query, range) {
            Ok(url) => url,
            Err(err) => {
                warn!(%query, error = %err, "could not build query URL");
                return Vec::new();
            }
        };

        let body = match self.transport.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(err) => {
                warn!(%query, error = %err, "range query failed");
                return Vec::new();
            }
        };

        let response: RangeResponse = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(err) => {
                let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
                warn!(%query, error = %err, %preview, "malformed range query response");
                return Vec::new();
            }
        };

        if response.status != SUCCESS_STATUS {
            warn!(%query, status = %response.status, "range query returned non-success envelope");
            return Vec::new();
        }

        response
            .data
            .result
            .into_iter()
            .map(series_from_result)
            .collect()
    }

    fn range_url(&self, query: &str, range: &TimeRange) -> Result<Url, url::ParseError> {
        let endpoint = format!(
            "{}/api/v1/query_range",
            self.base_url.trim_end_matches('/')
        );
        let mut url = Url::parse(&endpoint)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("start", &range.start.timestamp().to_string())
            .append_pair("end", &range.end.timestamp().to_string())
            .append_pair("step", &range.step_secs.to_string());
        Ok(url)
    }
}

fn series_from_result(result: RangeResult) -> MetricSeries {
    let mut labels = result.metric;
    let name = labels
        .remove(NAME_LABEL)
        .unwrap_or_else(|| "unknown".to_string());

    let (timestamps, values) = result
        .values
        .into_iter()
        .map(|(ts, raw)| (ts, parse_sample(&raw)))
        .unzip();

    MetricSeries {
        name,
        labels,
        timestamps,
        values,
    }
}

/// Non-numeric sample values (Prometheus emits `"NaN"`) become zero
fn parse_sample(raw: &str) -> f64 {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
