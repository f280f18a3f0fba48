//! Link-Sweeper: a concurrent broken-link crawler
//!
//! This crate discovers every internally reachable URL starting from a seed
//! address, probes each one for liveness, renders the live pages to find more
//! links, and reports the broken links together with the page that led to them.

pub mod config;
pub mod crawler;
pub mod output;
pub mod registry;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Sweeper operations
#[derive(Debug, Error)]
pub enum LinkCheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to crawl {url}: {message}")]
    Crawl { url: String, message: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::LinkState,
        to: state::LinkState,
    },

    #[error("Unknown link record: {0}")]
    UnknownRecord(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Link-Sweeper operations
pub type Result<T> = std::result::Result<T, LinkCheckError>;

// Re-export commonly used types
pub use config::Config;
pub use registry::{LinkRecord, Registry};
pub use state::{LinkState, Reachability, UnreachableReason};
pub use crate::url::{in_scope, normalize, parse_seed};
