// src/lib.rs
// =============================================================================
// Library root of link-prober.
//
// main.rs is only a thin wrapper: it parses flags, sets up logging and runs
// the axum server built from these modules. Keeping the logic here lets the
// integration tests in tests/ use it directly.
// =============================================================================

pub mod api;      // src/api/ - POST /parse handler and router
pub mod checker;  // src/checker/ - probing a single URL
pub mod cli;      // src/cli.rs - command-line parsing
pub mod config;   // src/config.rs - validated settings
pub mod pool;     // src/pool/ - dispatcher, workers and collector

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use api::AppState;
use checker::HttpFetcher;
use config::ProbeConfig;
use pool::Prober;

/// Builds the shared state for the router: a real HTTP fetcher behind a prober.
pub fn build_state(config: &ProbeConfig, shutdown: CancellationToken) -> reqwest::Result<AppState> {
    let fetcher = HttpFetcher::new(config)?;
    let prober = Prober::new(Arc::new(fetcher), config.clone());

    Ok(AppState { prober, shutdown })
}
