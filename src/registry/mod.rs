//! Link registry: the crawl's shared set of discovered URLs
//!
//! The registry is the only shared mutable structure of a crawl. It owns every
//! [`LinkRecord`], deduplicates them by canonical URL, doubles as the work queue
//! that workers claim from, and tracks how many claims are still in flight so
//! the pool can detect quiescence.
//!
//! All membership and state changes are serialized by a single mutex. Waiting
//! for work uses a [`Notify`] instead of polling: a worker that finds nothing to
//! claim sleeps until another worker either adds a link or completes a claim.

mod record;

pub use record::{Claim, LinkRecord, RegistryCounts};

use crate::state::{LinkState, Reachability, UnreachableReason};
use crate::LinkCheckError;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// Deduplicated, append-only registry of link records
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
    work_changed: Notify,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Records in discovery order; a record's id is its index
    records: Vec<LinkRecord>,

    /// Canonical URL -> record id
    index: HashMap<String, usize>,

    /// Ids of records still in `Pending`, oldest first
    pending: VecDeque<usize>,

    /// Number of claims handed out and not yet completed
    in_flight: usize,
}

impl RegistryInner {
    fn record_mut(&mut self, id: usize) -> Result<&mut LinkRecord, LinkCheckError> {
        self.records
            .get_mut(id)
            .ok_or(LinkCheckError::UnknownRecord(id))
    }

    fn transition(&mut self, id: usize, next: LinkState) -> Result<(), LinkCheckError> {
        let record = self.record_mut(id)?;
        if !record.state.can_transition_to(next) {
            return Err(LinkCheckError::InvalidTransition {
                from: record.state,
                to: next,
            });
        }
        record.state = next;
        Ok(())
    }

    fn claim_pending(&mut self) -> Option<Claim> {
        while let Some(id) = self.pending.pop_front() {
            if self.transition(id, LinkState::Probing).is_err() {
                // Only pending records are queued; skip anything else defensively
                continue;
            }
            self.in_flight += 1;
            let url = self.records[id].url.clone();
            return Some(Claim { id, url });
        }
        None
    }

    fn is_quiescent(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a canonical URL unless it is already known
    ///
    /// The lookup and the insert happen under one lock, so for any URL exactly
    /// one caller ever observes `true`. Everyone else receives a copy of the
    /// existing record.
    ///
    /// # Arguments
    ///
    /// * `url` - Canonical URL (already normalized and scope-checked)
    /// * `source` - Page the link was found on; `None` for the seed
    ///
    /// # Returns
    ///
    /// The record for `url` and whether this call created it
    pub fn add_if_absent(&self, url: Url, source: Option<Url>) -> (LinkRecord, bool) {
        let mut inner = self.lock();

        if let Some(&id) = inner.index.get(url.as_str()) {
            return (inner.records[id].clone(), false);
        }

        let id = inner.records.len();
        let record = LinkRecord::new(id, url, source);
        inner.index.insert(record.url.as_str().to_string(), id);
        inner.records.push(record.clone());
        inner.pending.push_back(id);
        drop(inner);

        self.work_changed.notify_waiters();
        (record, true)
    }

    /// Claims the next pending record, waiting for work if necessary
    ///
    /// The claimed record moves to `Probing` before the lock is released, so no
    /// two workers can claim the same record.
    ///
    /// # Returns
    ///
    /// * `Some(Claim)` - A record to process
    /// * `None` - The crawl is quiescent: nothing pending and no claim in flight
    pub async fn claim_next(&self) -> Option<Claim> {
        loop {
            // Register interest before inspecting state so a wakeup sent between
            // the check and the await is not lost.
            let notified = self.work_changed.notified();

            {
                let mut inner = self.lock();
                if let Some(claim) = inner.claim_pending() {
                    return Some(claim);
                }
                if inner.in_flight == 0 {
                    drop(inner);
                    // Let every other idle worker observe quiescence too
                    self.work_changed.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Claims the next pending record without waiting
    pub fn try_claim_next(&self) -> Option<Claim> {
        self.lock().claim_pending()
    }

    /// Moves a record to `next` if the state machine allows it
    pub fn transition(&self, id: usize, next: LinkState) -> Result<(), LinkCheckError> {
        self.lock().transition(id, next)
    }

    /// Stores a probe verdict and moves the record out of `Probing`
    ///
    /// # Returns
    ///
    /// The state the record moved to
    pub fn record_probe(
        &self,
        id: usize,
        reachability: Reachability,
    ) -> Result<LinkState, LinkCheckError> {
        let next = if reachability.is_reachable() {
            LinkState::ProbedReachable
        } else {
            LinkState::ProbedUnreachable
        };

        let mut inner = self.lock();
        inner.transition(id, next)?;
        inner.record_mut(id)?.reachability = Some(reachability);
        Ok(next)
    }

    /// Finishes a claim: moves the record to `Done` and releases the in-flight slot
    ///
    /// # Arguments
    ///
    /// * `id` - Id of the claimed record
    /// * `links_found` - Number of raw links the crawl returned
    pub fn complete(&self, id: usize, links_found: usize) -> Result<(), LinkCheckError> {
        {
            let mut inner = self.lock();
            inner.transition(id, LinkState::Done)?;
            inner.record_mut(id)?.links_found = links_found;
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }

        self.work_changed.notify_waiters();
        Ok(())
    }

    /// Force-completes a claimed record after a worker failure
    ///
    /// A record without a probe verdict is recorded as unreachable with reason
    /// `Aborted`. Records that are already `Done` (or were never claimed) are
    /// left untouched.
    ///
    /// # Returns
    ///
    /// `true` if the record was moved to `Done` by this call
    pub fn force_complete(&self, id: usize) -> bool {
        let changed = {
            let mut inner = self.lock();
            let moved = inner.transition(id, LinkState::Done).is_ok();
            if moved {
                if let Ok(record) = inner.record_mut(id) {
                    record
                        .reachability
                        .get_or_insert(Reachability::Unreachable {
                            reason: UnreachableReason::Aborted,
                        });
                }
                inner.in_flight = inner.in_flight.saturating_sub(1);
            }
            moved
        };

        if changed {
            self.work_changed.notify_waiters();
        }
        changed
    }

    /// Returns a copy of the record for a canonical URL
    pub fn get(&self, url: &Url) -> Option<LinkRecord> {
        let inner = self.lock();
        inner
            .index
            .get(url.as_str())
            .map(|&id| inner.records[id].clone())
    }

    /// Returns true when nothing is pending and no claim is in flight
    pub fn is_quiescent(&self) -> bool {
        self.lock().is_quiescent()
    }

    /// Returns the number of distinct URLs registered
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns whether no URL has been registered yet
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Computes aggregate counts for progress reporting
    pub fn counts(&self) -> RegistryCounts {
        let inner = self.lock();
        let mut counts = RegistryCounts {
            total: inner.records.len(),
            pending: inner.pending.len(),
            in_flight: inner.in_flight,
            ..RegistryCounts::default()
        };

        for record in &inner.records {
            if record.state.is_terminal() {
                counts.done += 1;
            }
            if record.is_reachable() {
                counts.reachable += 1;
            } else if record.is_unreachable() {
                counts.unreachable += 1;
            }
        }

        counts
    }

    /// Returns every record in discovery order
    pub fn snapshot(&self) -> Vec<LinkRecord> {
        self.lock().records.clone()
    }
}
