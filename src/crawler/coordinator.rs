//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires one crawl together:
//! - Validating the seed and registering it
//! - Building the HTTP prober and the page renderer
//! - Owning the shared browser's lifecycle (launched once, closed once)
//! - Running the worker pool to quiescence
//! - Freezing the registry into a [`CrawlReport`]

use crate::config::{Config, Renderer};
use crate::crawler::{
    build_http_client, BrowserCrawler, HttpProber, PageCrawler, Prober, Scheduler, SharedBrowser,
    StaticCrawler,
};
use crate::output::CrawlReport;
use crate::registry::Registry;
use crate::url::parse_seed;
use crate::LinkCheckError;
use chrono::Utc;
use std::sync::Arc;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    seed: Url,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `seed` - The seed URL as given by the user
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(LinkCheckError)` - The seed is not a crawlable http(s) URL
    pub fn new(config: Config, seed: &str) -> Result<Self, LinkCheckError> {
        let seed = parse_seed(seed)?;
        Ok(Self {
            config,
            seed,
            config_hash: None,
        })
    }

    /// Attaches the configuration file hash so it shows up in the report
    pub fn with_config_hash(mut self, hash: Option<String>) -> Self {
        self.config_hash = hash;
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Runs the crawl with the configured prober and renderer
    ///
    /// Setup failures (HTTP client, browser launch) are returned before any
    /// worker starts. Once workers run, per-link failures are contained and
    /// only show up in the report.
    pub async fn run(self) -> Result<CrawlReport, LinkCheckError> {
        let crawler_config = &self.config.crawler;
        let user_agent = &self.config.user_agent;

        let probe_client = build_http_client(
            user_agent,
            crawler_config.probe_timeout(),
            crawler_config.max_redirects,
        )?;
        let prober: Arc<dyn Prober> = Arc::new(HttpProber::new(probe_client));

        match crawler_config.renderer {
            Renderer::Browser => {
                let browser = Arc::new(SharedBrowser::launch(crawler_config, user_agent).await?);
                let crawler: Arc<dyn PageCrawler> =
                    Arc::new(BrowserCrawler::new(Arc::clone(&browser), crawler_config));

                let report = self.run_with(prober, crawler).await;

                // Workers are gone; this is the single teardown of the browser
                browser.close().await;
                Ok(report)
            }
            Renderer::Static => {
                let page_client = build_http_client(
                    user_agent,
                    crawler_config.crawl_timeout(),
                    crawler_config.max_redirects,
                )?;
                let crawler: Arc<dyn PageCrawler> = Arc::new(StaticCrawler::new(page_client));
                Ok(self.run_with(prober, crawler).await)
            }
        }
    }

    /// Runs the crawl with caller-supplied probing and rendering
    pub async fn run_with(
        &self,
        prober: Arc<dyn Prober>,
        crawler: Arc<dyn PageCrawler>,
    ) -> CrawlReport {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} with {} workers ({} renderer)",
            self.seed,
            self.config.crawler.concurrency,
            self.config.crawler.renderer
        );

        let registry = Arc::new(Registry::new());
        registry.add_if_absent(self.seed.clone(), None);

        let stats = Scheduler::new(
            Arc::clone(&registry),
            prober,
            crawler,
            self.seed.origin(),
            self.config.crawler.concurrency as usize,
        )
        .with_progress_interval(self.config.crawler.progress_interval)
        .run()
        .await;

        let finished_at = Utc::now();
        let report = CrawlReport::from_records(
            self.seed.clone(),
            &registry.snapshot(),
            started_at,
            finished_at,
        )
        .with_config_hash(self.config_hash.clone());

        tracing::info!(
            "Crawl completed: {} links checked ({} active, {} inactive) by {} workers in {:?}",
            report.total,
            report.active,
            report.inactive,
            stats.workers(),
            stats.elapsed
        );

        report
    }
}

/// Runs a complete crawl from a seed URL
///
/// # Example
///
/// ```no_run
/// use link_sweeper::config::Config;
/// use link_sweeper::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default(), "https://docs.example.com/").await?;
/// println!("{} broken links", report.inactive);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, seed: &str) -> Result<CrawlReport, LinkCheckError> {
    Coordinator::new(config, seed)?.run().await
}
