//! Crawl report built from the frozen registry
//!
//! This module turns the registry's records into the final totals and the
//! list of broken links, and prints them to stdout.

use crate::registry::LinkRecord;
use crate::state::{Reachability, UnreachableReason};
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// A link that failed its liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// The unreachable URL
    pub url: Url,

    /// Page the link was first discovered on; `None` when the seed itself is broken
    pub source: Option<Url>,

    /// Why the probe failed
    pub reason: UnreachableReason,
}

/// Final results of one crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// The seed URL the crawl started from
    pub seed: Url,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    /// Number of distinct in-scope URLs registered
    pub total: usize,

    /// Links whose probe succeeded
    pub active: usize,

    /// Links whose probe failed
    pub inactive: usize,

    /// Sum of raw links returned by every crawled page
    pub total_links_found: usize,

    /// Every inactive link, in discovery order
    pub broken: Vec<BrokenLink>,
}

impl CrawlReport {
    /// Builds a report from registry records
    ///
    /// A record counts as inactive only if it carries an unreachable verdict.
    /// After a normal run every record has one.
    pub fn from_records(
        seed: Url,
        records: &[LinkRecord],
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut report = Self {
            seed,
            started_at,
            finished_at,
            config_hash: None,
            total: records.len(),
            active: 0,
            inactive: 0,
            total_links_found: 0,
            broken: Vec::new(),
        };

        for record in records {
            report.total_links_found += record.links_found;

            match &record.reachability {
                Some(Reachability::Reachable { .. }) => report.active += 1,
                Some(Reachability::Unreachable { reason }) => {
                    report.inactive += 1;
                    report.broken.push(BrokenLink {
                        url: record.url.clone(),
                        source: record.source.clone(),
                        reason: reason.clone(),
                    });
                }
                None => {}
            }
        }

        report
    }

    pub fn with_config_hash(mut self, hash: Option<String>) -> Self {
        self.config_hash = hash;
        self
    }

    pub fn has_broken_links(&self) -> bool {
        !self.broken.is_empty()
    }

    /// Wall time of the crawl in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Percentage of checked links that are active
    pub fn success_rate(&self) -> f64 {
        let checked = self.active + self.inactive;
        if checked == 0 {
            0.0
        } else {
            (self.active as f64 / checked as f64) * 100.0
        }
    }
}

/// Formats the console summary
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("\n===== SUMMARY =====\n");
    out.push_str(&format!("Seed: {}\n", report.seed));
    out.push_str(&format!("Total links found: {}\n", report.total));
    out.push_str(&format!("Active links: {}\n", report.active));
    out.push_str(&format!("Inactive links: {}\n", report.inactive));
    out.push_str(&format!(
        "Duration: {}s ({:.1}% active)\n",
        report.duration_seconds(),
        report.success_rate()
    ));

    if report.has_broken_links() {
        out.push_str("\n===== INACTIVE LINKS =====\n");
        for link in &report.broken {
            out.push_str(&format!("{} ({})\n", link.url, link.reason));
            out.push_str(&format!(
                "  Found on: {}\n",
                link.source
                    .as_ref()
                    .map(Url::as_str)
                    .unwrap_or("Initial URL")
            ));
        }
    }

    out
}

/// Prints the summary to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
