use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Main configuration structure for Link-Sweeper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub concurrency: u32,

    /// Timeout for a single liveness probe (seconds)
    #[serde(rename = "probe-timeout-secs")]
    pub probe_timeout_secs: u64,

    /// Timeout for navigating to a page (seconds)
    #[serde(rename = "crawl-timeout-secs")]
    pub crawl_timeout_secs: u64,

    /// Timeout for waiting on a rendered page to settle (seconds)
    #[serde(rename = "settle-timeout-secs")]
    pub settle_timeout_secs: u64,

    /// Maximum number of redirects a probe follows
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// How pages are rendered to enumerate links
    pub renderer: Renderer,

    /// Log an aggregate progress line every this many completed links
    #[serde(rename = "progress-interval")]
    pub progress_interval: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            probe_timeout_secs: 10,
            crawl_timeout_secs: 30,
            settle_timeout_secs: 30,
            max_redirects: 10,
            renderer: Renderer::Browser,
            progress_interval: 10,
        }
    }
}

/// Page rendering backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Headless Chrome; executes scripts before reading links
    #[default]
    Browser,
    /// Plain HTTP fetch and HTML parse; no scripts
    Static,
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Browser => write!(f, "browser"),
            Renderer::Static => write!(f, "static"),
        }
    }
}

impl FromStr for Renderer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Renderer::Browser),
            "static" => Ok(Renderer::Static),
            other => Err(format!(
                "unknown renderer '{}', expected 'browser' or 'static'",
                other
            )),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub name: String,

    /// Version of the crawler
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file; no file is written when unset
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}
