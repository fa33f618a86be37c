//! Transports that carry a query URL to the Prometheus endpoint
//!
//! Two implementations behind one trait: direct HTTP from this
//! process, and remote exec into a workload that can reach the
//! endpoint (docker compose or kubectl). Both are bounded by the same
//! fixed timeout.

use crate::models::QueryBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Fixed per-query timeout applied by every transport
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("command `{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// A way to fetch the raw response body for a query URL
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, QueryError>;
}

/// Build the transport selected by configuration
pub fn for_backend(backend: &QueryBackend) -> Result<Box<dyn QueryTransport>, QueryError> {
    Ok(match backend {
        QueryBackend::Direct => Box::new(HttpTransport::new()?),
        QueryBackend::Compose { service } => Box::new(ExecTransport::compose(service)),
        QueryBackend::Kubernetes {
            namespace,
            deployment,
        } => Box::new(ExecTransport::kubectl(namespace, deployment)),
    })
}

/// Direct HTTP transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, QueryError> {
        let client = reqwest::Client::builder().timeout(QUERY_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, QueryError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Remote-exec transport: runs `curl -s '<url>'` inside a workload
/// that can reach the metrics backend.
pub struct ExecTransport {
    argv_prefix: Vec<String>,
}

impl ExecTransport {
    pub fn compose(service: &str) -> Self {
        let argv_prefix = vec![
            "docker".to_string(),
            "compose".to_string(),
            "exec".to_string(),
            "-T".to_string(),
            service.to_string(),
            "sh".to_string(),
            "-c".to_string(),
        ];
        Self { argv_prefix }
    }

    pub fn kubectl(namespace: &str, deployment: &str) -> Self {
        let argv_prefix = vec![
            "kubectl".to_string(),
            "exec".to_string(),
            "-n".to_string(),
            namespace.to_string(),
            format!("deployment/{}", deployment),
            "--".to_string(),
            "sh".to_string(),
            "-c".to_string(),
        ];
        Self { argv_prefix }
    }

    fn argv(&self, url: &str) -> Vec<String> {
        let mut argv = self.argv_prefix.clone();
        argv.push(format!("curl -s '{}'", url));
        argv
    }
}

#[async_trait]
impl QueryTransport for ExecTransport {
    async fn fetch(&self, url: &str) -> Result<String, QueryError> {
        let argv = self.argv(url);
        let command = argv.join(" ");

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]).kill_on_drop(true);

        let output = match tokio::time::timeout(QUERY_TIMEOUT, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(QueryError::Spawn { command, source }),
            Err(_) => {
                return Err(QueryError::Timeout {
                    command,
                    timeout: QUERY_TIMEOUT,
                })
            }
        };

        if !output.status.success() {
            return Err(QueryError::CommandFailed {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
