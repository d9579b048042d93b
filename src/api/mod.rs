// src/api/mod.rs
// =============================================================================
// The HTTP surface of the service: one router, one endpoint.
//
//   POST /parse   -> probe the submitted URLs (see parse.rs)
//
// AppState is cloned into every request. It holds the Prober (which shares
// one HTTP client across requests) and the shutdown token.
// =============================================================================

mod error;
mod parse;

use axum::{routing::post, Router};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::pool::Prober;

pub use error::ApiError;
pub use parse::{parse_urls, ParseRequest};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub prober: Prober,
    /// Cancelled when the server is shutting down; in-flight batches stop early
    pub shutdown: CancellationToken,
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/parse", post(parse_urls))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
