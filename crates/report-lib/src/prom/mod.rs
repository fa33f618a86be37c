//! Prometheus range-query access

pub mod client;
pub mod transport;

pub use client::PrometheusClient;
pub use transport::{ExecTransport, HttpTransport, QueryError, QueryTransport, QUERY_TIMEOUT};
