//! Configuration module for Link-Sweeper
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and layering command-line overrides on top of it.
//!
//! # Example
//!
//! ```no_run
//! use link_sweeper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-sweeper.toml")).unwrap();
//! println!("Crawler will run {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, Renderer, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::ConfigError;
use std::time::Duration;

/// Settings given on the command line; `None` keeps the file/default value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub concurrency: Option<u32>,
    pub renderer: Option<Renderer>,
    pub probe_timeout_secs: Option<u64>,
    pub crawl_timeout_secs: Option<u64>,
    pub summary_path: Option<String>,
}

impl Config {
    /// Applies command-line overrides and re-validates the result
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(concurrency) = overrides.concurrency {
            self.crawler.concurrency = concurrency;
        }
        if let Some(renderer) = overrides.renderer {
            self.crawler.renderer = renderer;
        }
        if let Some(secs) = overrides.probe_timeout_secs {
            self.crawler.probe_timeout_secs = secs;
        }
        if let Some(secs) = overrides.crawl_timeout_secs {
            self.crawler.crawl_timeout_secs = secs;
        }
        if overrides.summary_path.is_some() {
            self.output.summary_path = overrides.summary_path;
        }

        validation::validate(&self)?;
        Ok(self)
    }
}

impl CrawlerConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl_timeout_secs)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.settle_timeout_secs)
    }
}
