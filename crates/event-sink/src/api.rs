//! HTTP surface for the event sink

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::{info, warn};

/// Fixed banner returned for GET requests on any path
const BANNER: &str = "Event Sink - POST events to write to file";

/// Number of characters of the written line included in the log
const PREVIEW_CHARS: usize = 100;

/// Shared application state
pub struct AppState {
    output_path: PathBuf,
    /// Serializes appends so each request lands as exactly one line.
    append_lock: Mutex<()>,
}

impl AppState {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            append_lock: Mutex::new(()),
        }
    }

    /// Append a single line to the output file (open-append-close).
    async fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.append_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}

/// Canonicalize a request body into the line that gets appended.
///
/// Valid JSON is re-serialized in compact form; anything else is kept
/// as lossily-decoded text (invalid byte sequences become U+FFFD).
pub fn canonicalize(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|_| text.into_owned()),
        Err(_) => text.into_owned(),
    }
}

/// Single handler for every path; routing is method dispatch only.
async fn handle(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    match method {
        Method::POST => append_event(state, &body).await,
        Method::GET => (StatusCode::OK, [("content-type", "text/plain")], BANNER).into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn append_event(state: Arc<AppState>, body: &[u8]) -> Response {
    let line = canonicalize(body);

    if let Err(err) = state.append(&line).await {
        // The write failed for this request only; keep serving.
        warn!(error = %err, "failed to append event");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let preview: String = line.chars().take(PREVIEW_CHARS).collect();
    info!(%preview, "Received event");

    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

/// Create the sink router. Request bodies are uncapped; every POST
/// appends, whatever its size.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handle)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Start the sink server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting event sink server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::canonicalize;

    #[test]
    fn canonicalize_compacts_valid_json() {
        let body = br#"{ "a" : 1,  "b" : [1, 2] }"#;
        assert_eq!(canonicalize(body), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn canonicalize_keeps_non_json_text() {
        assert_eq!(canonicalize(b"not json at all"), "not json at all");
    }

    #[test]
    fn canonicalize_replaces_invalid_utf8() {
        let line = canonicalize(&[0xff, b'h', b'i']);
        assert_eq!(line, "\u{fffd}hi");
    }
}
