// src/checker/mod.rs
// =============================================================================
// This module contains the "probe one URL" logic.
//
// Submodules:
// - http: Makes the actual HTTP GET with reqwest and turns the outcome into a
//         status string ("200 OK", or an "ERROR: ..." marker)
//
// This file (mod.rs) is the module root. Besides re-exporting the HTTP
// implementation it defines the StatusFetcher trait, which is the seam the
// worker pool talks to. Production code plugs in HttpFetcher; tests plug in
// fakes with controlled latency.
//
// Rust concepts:
// - Traits: Describe behaviour that several types can share
// - async-trait: Lets a trait have async methods usable from tokio::spawn
// - Arc<dyn Trait>: A shared, dynamically-dispatched implementation
// =============================================================================

mod http;

use async_trait::async_trait;

// Re-export public items from submodules
// This lets users write `checker::HttpFetcher` instead of
// `checker::http::HttpFetcher`
pub use http::{error_marker, status_line, FetchError, HttpFetcher, ERROR_MARKER_PREFIX};

/// Something that can probe a URL and describe the outcome as a string.
///
/// Implementations must never fail: a transport problem is reported in-band
/// as an error marker (see [`error_marker`]) so every position in a batch
/// still gets a value.
#[async_trait]
pub trait StatusFetcher: Send + Sync + 'static {
    /// Performs one GET against `url` and returns its status line or an
    /// error marker.
    async fn fetch_status(&self, url: &str) -> String;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait here?
//    - The worker pool only needs "give me a status string for this URL"
//    - Hiding reqwest behind a trait means the pool can be tested without
//      the network, e.g. with a fetcher that sleeps and counts calls
//
// 2. What do Send + Sync + 'static mean?
//    - Send: the value can move to another thread
//    - Sync: the value can be shared between threads by reference
//    - 'static: it holds no short-lived borrows
//    - tokio::spawn needs all three because tasks may run on any thread
//
// 3. Why #[async_trait]?
//    - It rewrites `async fn` in the trait into a method returning a boxed
//      future that is Send, which is what tokio::spawn requires
// -----------------------------------------------------------------------------
