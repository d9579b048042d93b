// src/pool/queue.rs
// =============================================================================
// The two ends of the pipeline: the dispatcher that feeds the work queue and
// the collector that drains the result queue.
//
// How it works:
// 1. dispatch() numbers every URL by its input position and pushes
//    (position, url) pairs into the work queue, then closes it
// 2. Workers (see worker.rs) pull from the work queue and push
//    (position, status) pairs into the result queue
// 3. collect() writes each status into slot `position` of a pre-sized Vec,
//    so the output order matches the input order no matter which fetch
//    finishes first
//
// Rust concepts:
// - Ownership: a WorkItem moves from the dispatcher into exactly one worker
// - Vec<Option<String>>: "slot not filled yet" is None
// - tokio::select!: wait on two things at once (send vs. cancellation)
// =============================================================================

use async_channel::Sender;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::checker::{error_marker, FetchError};

/// A URL waiting to be probed, tagged with its position in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub position: usize,
    pub url: String,
}

/// The outcome of probing the URL at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub position: usize,
    pub status: String,
}

// Feeds every URL into the work queue and then closes it
//
// Closing the queue is how workers learn there is no more work: once it is
// closed and empty, recv() returns an error and the worker loop ends.
//
// Returns how many items were handed off. That is less than urls.len() only
// if the batch was cancelled or every worker went away.
pub async fn dispatch(
    urls: Vec<String>,
    work_queue: Sender<WorkItem>,
    cancel: &CancellationToken,
) -> usize {
    let mut sent = 0;

    for (position, url) in urls.into_iter().enumerate() {
        let item = WorkItem { position, url };

        tokio::select! {
            // Prefer stopping over pushing more work once cancelled
            biased;
            _ = cancel.cancelled() => break,
            result = work_queue.send(item) => {
                if result.is_err() {
                    // All receivers dropped: no worker is left to take it
                    warn!(position, "work queue closed early, no workers left");
                    break;
                }
                sent += 1;
            }
        }
    }

    work_queue.close();
    sent
}

// Drains the result queue into a Vec ordered by position
//
// Runs until every sender of the result queue is gone, which only happens
// after all workers exited and the orchestrator dropped its own handle.
//
// Slots nobody filled (cancelled batch, panicked worker) get an error marker
// so the returned Vec always has exactly `len` entries.
pub async fn collect(
    mut result_queue: Receiver<ResultItem>,
    len: usize,
    cancel: CancellationToken,
) -> Vec<String> {
    let mut slots: Vec<Option<String>> = vec![None; len];

    while let Some(ResultItem { position, status }) = result_queue.recv().await {
        match slots.get_mut(position) {
            Some(slot) => {
                if slot.is_some() {
                    warn!(position, "duplicate result for position, keeping the latest");
                }
                *slot = Some(status);
            }
            None => warn!(position, len, "result position out of range, dropped"),
        }
    }

    let missing = if cancel.is_cancelled() {
        FetchError::Cancelled
    } else {
        FetchError::WorkerFailed
    };

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| error_marker(&missing)))
        .collect()
}
