// src/pool/mod.rs
// =============================================================================
// This module is the fan-out/fan-in core of the service.
//
// Submodules:
// - queue: WorkItem/ResultItem plus the dispatcher and the collector
// - worker: The loop each pooled worker runs
// - prober: Wires the pieces together for one batch of URLs
//
// Data flow for one request:
//
//   urls ──dispatch──> [work queue] ──> worker 0..W ──> [result queue] ──collect──> Vec<String>
//
// Rust concepts:
// - Channels: Tasks talk by sending values, not by sharing memory
// - tokio::spawn: Run each worker as its own lightweight task
// =============================================================================

mod prober;
mod queue;
mod worker;

pub use prober::Prober;
pub use queue::{collect, dispatch, ResultItem, WorkItem};
pub use worker::worker;
