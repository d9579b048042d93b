// src/api/parse.rs
// =============================================================================
// POST /parse: probe a batch of URLs and return their statuses in order.
//
// Request body:  {"urls": ["http://a.test", "http://b.test"]}
// Response body: ["200 OK", "ERROR: connection failed"]
//
// We read the body as raw bytes and decode it ourselves instead of using
// axum's Json extractor, so every decoding problem comes back as the same
// 400 with a JSON error body.
// =============================================================================

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use super::{error::ApiError, AppState};
use crate::checker::ERROR_MARKER_PREFIX;

/// Body of a `/parse` request. Keys other than `urls` are ignored.
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub urls: Vec<String>,
}

pub async fn parse_urls(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let started = Instant::now();

    let request: ParseRequest = serde_json::from_slice(&body).map_err(ApiError::MalformedBody)?;
    let total = request.urls.len();

    // Cancelled on server shutdown, or when this future is dropped because
    // the client went away
    let cancel = state.shutdown.child_token();
    let _abort_on_drop = cancel.clone().drop_guard();

    let statuses = state.prober.probe_with_cancel(request.urls, cancel).await;

    let failed = statuses
        .iter()
        .filter(|s| s.starts_with(ERROR_MARKER_PREFIX))
        .count();

    let body = serde_json::to_vec(&statuses).map_err(ApiError::Internal)?;

    info!(
        urls = total,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "parse request completed"
    );

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ignores_extra_keys() {
        let request: ParseRequest =
            serde_json::from_str(r#"{"urls": ["http://a.test"], "extra": 1}"#).unwrap();
        assert_eq!(request.urls, vec!["http://a.test"]);
    }

    #[test]
    fn test_request_requires_urls() {
        assert!(serde_json::from_str::<ParseRequest>(r#"{"links": []}"#).is_err());
        assert!(serde_json::from_str::<ParseRequest>(r#"{"urls": "http://a.test"}"#).is_err());
        assert!(serde_json::from_str::<ParseRequest>(r#"{"urls": [1, 2]}"#).is_err());
        assert!(serde_json::from_str::<ParseRequest>(r#"["http://a.test"]"#).is_err());
    }
}
