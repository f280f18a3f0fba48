//! Crawler module for probing and rendering pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP liveness probing
//! - Page rendering (headless browser or static HTML) and link extraction
//! - The worker pool that drains the link registry
//! - Overall crawl coordination

mod browser;
mod coordinator;
mod parser;
mod prober;
mod scheduler;
mod static_page;

pub use browser::{BrowserCrawler, PageSession, SharedBrowser};
pub use coordinator::{run_crawl, Coordinator};
pub use parser::extract_hrefs;
pub use prober::{build_http_client, HttpProber};
pub use scheduler::{Scheduler, SchedulerStats};
pub use static_page::StaticCrawler;

use crate::state::Reachability;
use crate::LinkCheckError;
use async_trait::async_trait;
use url::Url;

/// Decides whether a URL is reachable
///
/// Implementations always produce a verdict: transport failures are a kind of
/// unreachable, not an error.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &Url) -> Reachability;
}

/// Renders a page and lists the links it contains
///
/// Returns raw hrefs in document order; the caller normalizes and scope-checks
/// them. An `Err` means the page could not be crawled. The caller records the
/// page with zero links and carries on.
#[async_trait]
pub trait PageCrawler: Send + Sync {
    async fn crawl(&self, url: &Url) -> Result<Vec<String>, LinkCheckError>;
}

