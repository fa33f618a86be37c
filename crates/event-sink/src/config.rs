//! Event sink configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Port the HTTP listener binds on all interfaces
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// File every received event is appended to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_listen_port() -> u16 {
    8080
}

fn default_output_path() -> PathBuf {
    PathBuf::from("/app/output/events.json")
}

impl SinkConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SINK"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| SinkConfig {
            listen_port: default_listen_port(),
            output_path: default_output_path(),
        }))
    }
}
