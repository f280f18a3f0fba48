//! Worker pool that drains the link registry
//!
//! This module handles:
//! - Spawning a fixed number of workers over one shared registry
//! - Per-link processing: probe, crawl when reachable, admit discovered links
//! - Containing per-link failures (errors and panics) so a worker keeps going
//! - Progress logging
//!
//! Workers never poll. [`Registry::claim_next`] parks an idle worker until
//! another worker adds or completes a link, and returns `None` to every worker
//! once nothing is pending and nothing is in flight.

use crate::crawler::{PageCrawler, Prober};
use crate::registry::{Claim, Registry};
use crate::state::{LinkState, Reachability};
use crate::url::{admit, LinkAdmission};
use crate::LinkCheckError;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::{Origin, Url};

const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Statistics for a finished worker pool run
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    /// Links processed by each worker, indexed by worker id
    pub processed_per_worker: Vec<usize>,

    /// Wall time from spawning the workers until the last one exited
    pub elapsed: Duration,
}

impl SchedulerStats {
    pub fn total_processed(&self) -> usize {
        self.processed_per_worker.iter().sum()
    }

    pub fn workers(&self) -> usize {
        self.processed_per_worker.len()
    }
}

/// Fixed-size pool of crawl workers
pub struct Scheduler {
    registry: Arc<Registry>,
    prober: Arc<dyn Prober>,
    crawler: Arc<dyn PageCrawler>,
    seed_origin: Origin,
    concurrency: usize,
    progress_interval: usize,
}

impl Scheduler {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry holding at least the seed record
    /// * `prober` - Liveness prober shared by all workers
    /// * `crawler` - Page crawler shared by all workers
    /// * `seed_origin` - Only links on this origin are registered
    /// * `concurrency` - Number of workers; values below 1 are treated as 1
    pub fn new(
        registry: Arc<Registry>,
        prober: Arc<dyn Prober>,
        crawler: Arc<dyn PageCrawler>,
        seed_origin: Origin,
        concurrency: usize,
    ) -> Self {
        Self {
            registry,
            prober,
            crawler,
            seed_origin,
            concurrency: concurrency.max(1),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Sets how many completed links pass between aggregate progress lines
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Runs the workers until the registry is quiescent
    ///
    /// Consumes the scheduler so the prober and crawler handles are released
    /// as soon as the last worker exits.
    pub async fn run(self) -> SchedulerStats {
        let worker_count = self.concurrency;
        let context = Arc::new(WorkerContext {
            registry: self.registry,
            prober: self.prober,
            crawler: self.crawler,
            seed_origin: self.seed_origin,
            progress_interval: self.progress_interval,
            completed: AtomicUsize::new(0),
        });

        tracing::info!("Starting {} workers", worker_count);
        let started = Instant::now();

        let handles: Vec<_> = (0..worker_count)
            .map(|worker_id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { context.worker_loop(worker_id).await })
            })
            .collect();

        let mut processed_per_worker = Vec::with_capacity(worker_count);
        for (worker_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(processed) => processed_per_worker.push(processed),
                Err(e) => {
                    tracing::error!("Worker {} terminated abnormally: {}", worker_id, e);
                    processed_per_worker.push(0);
                }
            }
        }

        let stats = SchedulerStats {
            processed_per_worker,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "All workers finished: {} links processed in {:?}",
            stats.total_processed(),
            stats.elapsed
        );

        stats
    }
}

struct WorkerContext {
    registry: Arc<Registry>,
    prober: Arc<dyn Prober>,
    crawler: Arc<dyn PageCrawler>,
    seed_origin: Origin,
    progress_interval: usize,
    completed: AtomicUsize,
}

impl WorkerContext {
    async fn worker_loop(&self, worker_id: usize) -> usize {
        let mut processed = 0;

        while let Some(claim) = self.registry.claim_next().await {
            let guard = ClaimGuard {
                registry: &self.registry,
                claim: &claim,
            };

            match AssertUnwindSafe(self.process(&claim)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!("Worker {} failed on {}: {}", worker_id, claim.url, e);
                }
                Err(panic) => {
                    tracing::error!(
                        "Worker {} panicked on {}: {}",
                        worker_id,
                        claim.url,
                        panic_message(panic.as_ref())
                    );
                }
            }

            drop(guard);
            processed += 1;
            self.record_progress();
        }

        tracing::debug!("Worker {} exiting after {} links", worker_id, processed);
        processed
    }

    /// Probes one claimed link and crawls it when reachable
    async fn process(&self, claim: &Claim) -> Result<(), LinkCheckError> {
        let reachability = self.prober.probe(&claim.url).await;
        let state = self.registry.record_probe(claim.id, reachability.clone())?;

        match &reachability {
            Reachability::Reachable { status } => {
                tracing::info!("Visiting {} ({})", claim.url, status)
            }
            Reachability::Unreachable { reason } => {
                tracing::error!("Broken link {}: {}", claim.url, reason)
            }
        }

        if state == LinkState::ProbedUnreachable {
            return self.registry.complete(claim.id, 0);
        }

        self.registry.transition(claim.id, LinkState::Crawling)?;

        let links = match self.crawler.crawl(&claim.url).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Could not crawl {}: {}", claim.url, e);
                Vec::new()
            }
        };

        // Everything found must be registered before this claim stops counting
        // as in flight, or an idle worker could observe a false quiescence.
        let added = self.admit_links(&claim.url, &links);
        tracing::debug!(
            "{}: {} links, {} new",
            claim.url,
            links.len(),
            added
        );

        self.registry.complete(claim.id, links.len())
    }

    fn admit_links(&self, page: &Url, links: &[String]) -> usize {
        let mut added = 0;

        for raw in links {
            match admit(raw, page, &self.seed_origin) {
                LinkAdmission::Admit(url) => {
                    if self.registry.add_if_absent(url, Some(page.clone())).1 {
                        added += 1;
                    }
                }
                LinkAdmission::OutOfScope(url) => {
                    tracing::trace!("Skipping out-of-scope link {} on {}", url, page);
                }
                LinkAdmission::Malformed => {}
            }
        }

        added
    }

    fn record_progress(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % self.progress_interval != 0 {
            return;
        }

        let counts = self.registry.counts();
        tracing::info!(
            "Progress: {} links found, {} checked, {} active, {} inactive, {} pending",
            counts.total,
            counts.done,
            counts.reachable,
            counts.unreachable,
            counts.pending
        );
    }
}

/// Force-completes a claim if processing ends without completing it
struct ClaimGuard<'a> {
    registry: &'a Registry,
    claim: &'a Claim,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if self.registry.force_complete(self.claim.id) {
            tracing::warn!("Force-completed {} after a failure", self.claim.url);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
