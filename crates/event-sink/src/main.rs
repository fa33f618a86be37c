//! Event Sink - file-backed JSON event capture service
//!
//! Listens on all interfaces and appends one line per POSTed payload
//! to the configured output file.

use anyhow::Result;
use event_sink::{api, config::SinkConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = SinkConfig::load()?;
    info!(output_path = %config.output_path.display(), "Starting event-sink");

    let state = Arc::new(api::AppState::new(config.output_path));
    api::serve(config.listen_port, state).await
}
