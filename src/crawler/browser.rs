//! Headless browser page crawler
//!
//! One Chrome instance is launched per run and shared by every worker. Each
//! crawl opens its own browser context (separate cookies, storage and cache) with
//! a single page in it, so concurrent crawls cannot observe each other.
//!
//! chromiumoxide pages and contexts have no `Drop` cleanup of their own, so
//! [`PageSession`] closes them explicitly and falls back to a spawned cleanup
//! task when dropped on an error path.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::PageCrawler;
use crate::LinkCheckError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{BrowserContextId, CloseParams};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Collects the resolved `href` of every anchor in the live DOM
const COLLECT_LINKS_JS: &str =
    "Array.from(document.querySelectorAll('a[href]'), a => a.href)";

const COUNT_LINKS_JS: &str = "document.querySelectorAll('a[href]').length";

/// Resolves once the document has loaded and the network has been quiet for 500ms
const SETTLE_JS: &str = r#"
new Promise(resolve => {
    const quiet = () => {
        let last = performance.getEntriesByType('resource').length;
        const check = () => {
            const now = performance.getEntriesByType('resource').length;
            if (now === last) { resolve(true); } else { last = now; setTimeout(check, 500); }
        };
        setTimeout(check, 500);
    };
    if (document.readyState === 'complete') { quiet(); }
    else { window.addEventListener('load', quiet, { once: true }); }
})
"#;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

fn browser_error(context: &str, e: impl Display) -> LinkCheckError {
    LinkCheckError::Browser(format!("{}: {}", context, e))
}

/// The run's single browser process and its CDP event loop
pub struct SharedBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
    closed: AtomicBool,
}

impl SharedBrowser {
    /// Launches headless Chrome
    ///
    /// A launch failure is fatal for the run: no worker starts without a browser.
    pub async fn launch(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, LinkCheckError> {
        let config = BrowserConfig::builder()
            .request_timeout(crawler.crawl_timeout())
            .arg("--no-sandbox")
            .arg(format!("--user-agent={}", user_agent.header_value()))
            .build()
            .map_err(|e| browser_error("invalid browser configuration", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| browser_error("failed to launch browser", e))?;

        // The CDP connection only makes progress while the handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
            tracing::debug!("Browser handler finished");
        });

        tracing::info!("Launched headless browser");

        Ok(Self {
            browser,
            handler_task,
            closed: AtomicBool::new(false),
        })
    }

    /// Shuts the browser down; later calls are no-ops
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        match tokio::time::timeout(CLOSE_TIMEOUT, self.browser.execute(CloseParams::default()))
            .await
        {
            Ok(Ok(_)) => tracing::info!("Closed headless browser"),
            Ok(Err(e)) => tracing::warn!("Browser close command failed: {}", e),
            Err(_) => tracing::warn!("Browser did not close within {:?}", CLOSE_TIMEOUT),
        }

        self.handler_task.abort();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for SharedBrowser {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// A page inside its own browser context
///
/// Call [`PageSession::close`] when done; dropping the session instead spawns
/// the same cleanup in the background.
pub struct PageSession {
    browser: Arc<SharedBrowser>,
    page: Option<Page>,
    context_id: Option<BrowserContextId>,
}

impl PageSession {
    pub async fn open(browser: Arc<SharedBrowser>) -> Result<Self, LinkCheckError> {
        let context_id = browser
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| browser_error("failed to create browser context", e))?
            .result
            .browser_context_id;

        // From here on the session owns the context and disposes it on every path
        let mut session = Self {
            browser,
            page: None,
            context_id: Some(context_id.clone()),
        };

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(|e| browser_error("invalid page parameters", e))?;

        let page = session
            .browser
            .browser
            .new_page(params)
            .await
            .map_err(|e| browser_error("failed to open page", e))?;
        session.page = Some(page);

        Ok(session)
    }

    pub fn page(&self) -> Result<&Page, LinkCheckError> {
        self.page
            .as_ref()
            .ok_or_else(|| LinkCheckError::Browser("page session already closed".to_string()))
    }

    /// Closes the page and disposes its context
    pub async fn close(mut self) {
        let page = self.page.take();
        let context_id = self.context_id.take();
        release(self.browser.as_ref(), page, context_id).await;
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        if self.page.is_none() && self.context_id.is_none() {
            return;
        }

        let page = self.page.take();
        let context_id = self.context_id.take();
        if spawn_release(Arc::clone(&self.browser), page, context_id).is_none() {
            tracing::warn!("Page session dropped outside the runtime; not released");
        }
    }
}

/// Teardown operations a [`PageSession`] needs from its browser
#[async_trait]
trait SessionCleanup: Send + Sync + 'static {
    type Page: Send + 'static;
    type ContextId: Send + 'static;

    fn is_closed(&self) -> bool;
    async fn close_page(&self, page: Self::Page) -> Result<(), String>;
    async fn dispose_context(&self, id: Self::ContextId) -> Result<(), String>;
}

#[async_trait]
impl SessionCleanup for SharedBrowser {
    type Page = Page;
    type ContextId = BrowserContextId;

    fn is_closed(&self) -> bool {
        SharedBrowser::is_closed(self)
    }

    async fn close_page(&self, page: Page) -> Result<(), String> {
        page.close().await.map_err(|e| e.to_string())
    }

    async fn dispose_context(&self, id: BrowserContextId) -> Result<(), String> {
        self.browser
            .execute(DisposeBrowserContextParams::new(id))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Closes the page, then disposes its context; a no-op once the browser is closed
async fn release<B: SessionCleanup + ?Sized>(
    browser: &B,
    page: Option<B::Page>,
    context_id: Option<B::ContextId>,
) {
    if browser.is_closed() {
        return;
    }

    if let Some(page) = page {
        if let Err(e) = browser.close_page(page).await {
            tracing::debug!("Failed to close page: {}", e);
        }
    }

    if let Some(id) = context_id {
        if let Err(e) = browser.dispose_context(id).await {
            tracing::debug!("Failed to dispose browser context: {}", e);
        }
    }
}

/// Runs [`release`] on the current runtime; `None` when there is no runtime
fn spawn_release<B: SessionCleanup>(
    browser: Arc<B>,
    page: Option<B::Page>,
    context_id: Option<B::ContextId>,
) -> Option<JoinHandle<()>> {
    let handle = tokio::runtime::Handle::try_current().ok()?;
    Some(handle.spawn(async move {
        release(browser.as_ref(), page, context_id).await;
    }))
}

/// Renders pages in the shared browser and reads links from the live DOM
pub struct BrowserCrawler {
    browser: Arc<SharedBrowser>,
    crawl_timeout: Duration,
    settle_timeout: Duration,
}

impl BrowserCrawler {
    pub fn new(browser: Arc<SharedBrowser>, crawler: &CrawlerConfig) -> Self {
        Self {
            browser,
            crawl_timeout: crawler.crawl_timeout(),
            settle_timeout: crawler.settle_timeout(),
        }
    }

    async fn collect_links(&self, page: &Page, url: &Url) -> Result<Vec<String>, LinkCheckError> {
        match tokio::time::timeout(self.crawl_timeout, page.goto(url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(LinkCheckError::Crawl {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(LinkCheckError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        let before = count_links(page).await;

        // Scripts may keep adding links after load; a page that never goes quiet
        // is crawled as it stands when the wait runs out.
        match tokio::time::timeout(self.settle_timeout, page.evaluate(SETTLE_JS)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::debug!("Settle wait failed on {}: {}", url, e),
            Err(_) => tracing::warn!(
                "{} did not settle within {:?}, reading links anyway",
                url,
                self.settle_timeout
            ),
        }

        let links: Vec<String> = page
            .evaluate(COLLECT_LINKS_JS)
            .await
            .map_err(|e| browser_error("link extraction failed", e))?
            .into_value()
            .map_err(|e| browser_error("unexpected link extraction result", e))?;

        tracing::debug!(
            "{}: {} links on load, {} after scripts settled",
            url,
            before.map_or_else(|| "?".to_string(), |n| n.to_string()),
            links.len()
        );

        Ok(links)
    }
}

async fn count_links(page: &Page) -> Option<usize> {
    page.evaluate(COUNT_LINKS_JS)
        .await
        .ok()
        .and_then(|result| result.into_value().ok())
}

#[async_trait]
impl PageCrawler for BrowserCrawler {
    async fn crawl(&self, url: &Url) -> Result<Vec<String>, LinkCheckError> {
        let session = PageSession::open(Arc::clone(&self.browser)).await?;
        let result = match session.page() {
            Ok(page) => self.collect_links(page, url).await,
            Err(e) => Err(e),
        };
        session.close().await;
        result
    }
}
