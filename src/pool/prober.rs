// src/pool/prober.rs
// =============================================================================
// Orchestrates one batch: dispatcher -> worker pool -> collector.
//
// Every call to Prober::probe() builds a fresh set of queues and workers, so
// requests never share state. Only the fetcher (and its HTTP client) is
// shared between requests.
//
// The order of steps matters:
// 1. Init:           create the work queue and the result queue
// 2. Running:        spawn the collector FIRST, then the workers. The queues
//                    hold at most one item, so if nobody were reading results,
//                    workers would block on their first send
// 3. Draining:       the dispatcher pushes every URL and closes the work queue
// 4. WaitingWorkers: wait for every worker task to finish (completion barrier)
// 5. Done:           drop our result sender; the result queue is now closed,
//                    the collector sees that and returns the ordered Vec
// =============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::queue::{collect, dispatch};
use super::worker::worker;
use crate::checker::{error_marker, FetchError, StatusFetcher};
use crate::config::ProbeConfig;

// Both queues are as close to rendezvous channels as the crates allow
// (neither async-channel nor tokio's mpsc accepts a capacity of zero)
const QUEUE_CAPACITY: usize = 1;

/// Lifecycle of a single batch, used for debug logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Running,
    Draining,
    WaitingWorkers,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::Running => "running",
            Phase::Draining => "draining",
            Phase::WaitingWorkers => "waiting_workers",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Probes batches of URLs with a bounded pool of workers.
///
/// Cheap to clone; clones share the same fetcher.
#[derive(Clone)]
pub struct Prober {
    fetcher: Arc<dyn StatusFetcher>,
    config: ProbeConfig,
}

impl Prober {
    /// `config` must have passed [`ProbeConfig::validate`].
    pub fn new(fetcher: Arc<dyn StatusFetcher>, config: ProbeConfig) -> Self {
        // With zero workers the dispatcher finds no receivers and every
        // slot comes back as "worker failed", so this can't hang in release
        debug_assert!(config.validate().is_ok(), "pool size must be at least 1");
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probes every URL and returns one status per URL, in input order.
    pub async fn probe(&self, urls: Vec<String>) -> Vec<String> {
        self.probe_with_cancel(urls, CancellationToken::new()).await
    }

    /// Like [`Prober::probe`], but stops early once `cancel` fires.
    ///
    /// URLs that were not probed by then come back as `"ERROR: cancelled"`,
    /// so the returned Vec still has one entry per input URL.
    pub async fn probe_with_cancel(
        &self,
        urls: Vec<String>,
        cancel: CancellationToken,
    ) -> Vec<String> {
        let started = Instant::now();
        let len = urls.len();
        let workers = self.config.workers_for(len);

        debug!(phase = %Phase::Init, urls = len, workers, "starting batch");
        let (work_tx, work_rx) = async_channel::bounded(QUEUE_CAPACITY);
        let (result_tx, result_rx) = mpsc::channel(QUEUE_CAPACITY);

        debug!(phase = %Phase::Running, "spawning collector and workers");
        let collector = tokio::spawn(collect(result_rx, len, cancel.clone()));

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    self.fetcher.clone(),
                    work_rx.clone(),
                    result_tx.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        // Only workers may hold receivers, otherwise the dispatcher could not
        // notice that every worker is gone
        drop(work_rx);

        debug!(phase = %Phase::Draining, "dispatching urls");
        let dispatched = dispatch(urls, work_tx, &cancel).await;
        if dispatched < len {
            warn!(dispatched, urls = len, "not every url was dispatched");
        }

        debug!(phase = %Phase::WaitingWorkers, "waiting for workers");
        for (id, outcome) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = outcome {
                error!(worker = id, error = %e, "worker task failed");
            }
        }

        // Last sender gone: the result queue is closed and the collector returns
        drop(result_tx);

        let statuses = match collector.await {
            Ok(statuses) => statuses,
            Err(e) => {
                error!(error = %e, "collector task failed");
                vec![error_marker(&FetchError::WorkerFailed); len]
            }
        };

        debug!(
            phase = %Phase::Done,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // Sleeps for the number of milliseconds encoded after the last '/'
    // in the URL, then echoes the URL back. Tracks how many calls overlap.
    #[derive(Default)]
    struct SlowFetcher {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusFetcher for SlowFetcher {
        async fn fetch_status(&self, url: &str) -> String {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = url
                .rsplit('/')
                .next()
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if url.contains("fail") {
                error_marker(&FetchError::Connect)
            } else {
                format!("200 OK {url}")
            }
        }
    }

    struct PanicFetcher;

    #[async_trait]
    impl StatusFetcher for PanicFetcher {
        async fn fetch_status(&self, url: &str) -> String {
            if url == "boom" {
                panic!("fetcher exploded");
            }
            "200 OK".to_string()
        }
    }

    struct StuckFetcher;

    #[async_trait]
    impl StatusFetcher for StuckFetcher {
        async fn fetch_status(&self, _url: &str) -> String {
            std::future::pending().await
        }
    }

    fn prober_with(fetcher: Arc<dyn StatusFetcher>, pool_size: usize) -> Prober {
        Prober::new(
            fetcher,
            ProbeConfig {
                pool_size,
                ..ProbeConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let prober = prober_with(Arc::new(SlowFetcher::default()), 4);
        assert!(prober.probe(Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_order_preserved_with_varied_latency() {
        let prober = prober_with(Arc::new(SlowFetcher::default()), 8);

        // Earlier URLs are slower, so they finish last
        let urls: Vec<String> = (0..16)
            .map(|i| format!("http://site{i}.test/{}", (16 - i) * 3))
            .collect();

        let statuses = prober.probe(urls.clone()).await;
        assert_eq!(statuses.len(), urls.len());
        for (url, status) in urls.iter().zip(&statuses) {
            assert_eq!(status, &format!("200 OK {url}"));
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_pool_size() {
        let fetcher = Arc::new(SlowFetcher::default());
        let prober = prober_with(fetcher.clone(), 3);

        let urls: Vec<String> = (0..12).map(|i| format!("http://s{i}.test/20")).collect();
        let statuses = prober.probe(urls).await;

        assert_eq!(statuses.len(), 12);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 12);
        let max = fetcher.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "saw {max} concurrent fetches");
        assert!(max >= 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_position() {
        let prober = prober_with(Arc::new(SlowFetcher::default()), 2);
        let urls = vec![
            "http://ok.test/5".to_string(),
            "http://fail.test/1".to_string(),
            "http://ok2.test/5".to_string(),
        ];

        let statuses = prober.probe(urls).await;
        assert_eq!(statuses[0], "200 OK http://ok.test/5");
        assert_eq!(statuses[1], "ERROR: connection failed");
        assert_eq!(statuses[2], "200 OK http://ok2.test/5");
    }

    #[tokio::test]
    async fn test_repeated_batches_have_same_shape() {
        let prober = prober_with(Arc::new(SlowFetcher::default()), 4);
        let urls: Vec<String> = (0..7).map(|i| format!("http://r{i}.test/{i}")).collect();

        let first = prober.probe(urls.clone()).await;
        let second = prober.probe(urls).await;
        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_panicking_worker_leaves_marker() {
        let prober = prober_with(Arc::new(PanicFetcher), 2);
        let urls = vec!["a".to_string(), "boom".to_string(), "c".to_string()];

        let statuses = prober.probe(urls).await;
        assert_eq!(statuses, vec!["200 OK", "ERROR: worker failed", "200 OK"]);
    }

    #[tokio::test]
    async fn test_cancel_aborts_stuck_batch() {
        let prober = prober_with(Arc::new(StuckFetcher), 2);
        let urls: Vec<String> = (0..5).map(|i| format!("http://stuck{i}.test")).collect();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let statuses = prober.probe_with_cancel(urls, cancel).await;
        assert_eq!(statuses.len(), 5);
        assert!(statuses.iter().all(|s| s == "ERROR: cancelled"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "pool size must be at least 1")]
    fn test_zero_pool_size_is_rejected() {
        prober_with(Arc::new(StuckFetcher), 0);
    }
}
