// src/api/error.rs
// =============================================================================
// Errors a request handler can return, and how they map to HTTP responses.
//
// A bad request body is the client's problem (400). Failing to encode our own
// response is ours (500). Either way only this one request fails; the server
// keeps running.
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON, not an object, or `urls` is missing / not a list of strings
    #[error("malformed request body: {0}")]
    MalformedBody(#[source] serde_json::Error),
    /// The response could not be serialized
    #[error("failed to encode response")]
    Internal(#[source] serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::MalformedBody(e) => warn!(error = %e, "rejected request"),
            ApiError::Internal(e) => error!(error = %e, "request failed"),
        }

        let payload = json!({
            "error": self.to_string()
        });

        (status, Json(payload)).into_response()
    }
}
