use crate::state::{LinkState, Reachability};
use serde::Serialize;
use url::Url;

/// One discovered link, keyed by its canonical URL
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    /// Position in discovery order; stable for the whole run
    pub id: usize,

    /// Canonical absolute URL (fragment stripped)
    pub url: Url,

    /// Page on which this link was first discovered; `None` for the seed
    pub source: Option<Url>,

    /// Current lifecycle state
    pub state: LinkState,

    /// Probe verdict, once the probe has run
    pub reachability: Option<Reachability>,

    /// Number of raw links the crawl of this page returned
    pub links_found: usize,
}

impl LinkRecord {
    pub(crate) fn new(id: usize, url: Url, source: Option<Url>) -> Self {
        Self {
            id,
            url,
            source,
            state: LinkState::Pending,
            reachability: None,
            links_found: 0,
        }
    }

    /// Returns true if the probe classified this link as reachable
    pub fn is_reachable(&self) -> bool {
        self.reachability
            .as_ref()
            .map(Reachability::is_reachable)
            .unwrap_or(false)
    }

    /// Returns true if the link was probed (or aborted) and found broken
    pub fn is_unreachable(&self) -> bool {
        matches!(self.reachability, Some(Reachability::Unreachable { .. }))
    }
}

/// A record a worker has claimed for processing
///
/// Holding a claim is what entitles a worker to move the record forward. The
/// registry counts every outstanding claim as in-flight work until it is
/// completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: usize,
    pub url: Url,
}

/// Aggregate counts over the registry, used for progress logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    pub total: usize,
    pub pending: usize,
    pub in_flight: usize,
    pub done: usize,
    pub reachable: usize,
    pub unreachable: usize,
}
