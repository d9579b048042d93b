// src/pool/worker.rs
// =============================================================================
// A single worker of the pool.
//
// Each worker is a tokio task running the same loop:
// 1. Pull the next WorkItem from the shared work queue
// 2. Probe its URL through the StatusFetcher
// 3. Push a ResultItem with the same position into the result queue
// 4. Stop when the work queue is closed and empty (or the batch is cancelled)
//
// Many workers read from the same work queue. async-channel hands every item
// to exactly one of them, so no URL is probed twice.
// =============================================================================

use std::sync::Arc;

use async_channel::Receiver;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::queue::{ResultItem, WorkItem};
use crate::checker::StatusFetcher;

/// Runs one worker until the work queue is drained. Returns how many URLs it probed.
pub async fn worker(
    id: usize,
    fetcher: Arc<dyn StatusFetcher>,
    work_queue: Receiver<WorkItem>,
    result_queue: Sender<ResultItem>,
    cancel: CancellationToken,
) -> usize {
    let mut probed = 0;

    loop {
        let WorkItem { position, url } = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = work_queue.recv() => match next {
                Ok(item) => item,
                // Closed and empty: no more work is coming
                Err(_) => break,
            },
        };

        trace!(worker = id, position, url = %url, "picked up url");

        // A cancelled fetch leaves its slot empty; the collector marks it
        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            status = fetcher.fetch_status(&url) => status,
        };
        probed += 1;

        if result_queue.send(ResultItem { position, status }).await.is_err() {
            // The collector is gone, nobody would read further results
            break;
        }
    }

    debug!(worker = id, probed, "worker finished");
    probed
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct EchoFetcher;

    #[async_trait]
    impl StatusFetcher for EchoFetcher {
        async fn fetch_status(&self, url: &str) -> String {
            format!("seen {url}")
        }
    }

    struct NeverFetcher;

    #[async_trait]
    impl StatusFetcher for NeverFetcher {
        async fn fetch_status(&self, _url: &str) -> String {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_worker_drains_queue_and_exits() {
        let (work_tx, work_rx) = async_channel::unbounded();
        let (result_tx, mut result_rx) = mpsc::channel(8);

        for (position, url) in ["a", "b"].iter().enumerate() {
            work_tx
                .send(WorkItem { position, url: url.to_string() })
                .await
                .unwrap();
        }
        work_tx.close();

        let probed = worker(
            0,
            Arc::new(EchoFetcher),
            work_rx,
            result_tx,
            CancellationToken::new(),
        )
        .await;
        assert_eq!(probed, 2);

        assert_eq!(
            result_rx.recv().await,
            Some(ResultItem { position: 0, status: "seen a".to_string() })
        );
        assert_eq!(
            result_rx.recv().await,
            Some(ResultItem { position: 1, status: "seen b".to_string() })
        );
        // The worker dropped its sender on exit
        assert_eq!(result_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_worker_stops_on_cancel_mid_fetch() {
        let (work_tx, work_rx) = async_channel::unbounded();
        let (result_tx, mut result_rx) = mpsc::channel(8);
        work_tx
            .send(WorkItem { position: 0, url: "stuck".to_string() })
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(worker(
            0,
            Arc::new(NeverFetcher),
            work_rx,
            result_tx,
            cancel.clone(),
        ));

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), 0);
        assert_eq!(result_rx.recv().await, None);
    }
}
