//! URL handling module for Link-Sweeper
//!
//! This module provides link canonicalization, seed validation and the
//! same-origin scope filter that keeps the crawl on the seed's site.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{normalize, parse_seed};
pub use scope::in_scope;

use ::url::{Origin, Url};

/// What happened to a raw link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAdmission {
    /// Canonical, same-origin URL that should be registered
    Admit(Url),
    /// Valid URL on another origin; observed but never registered
    OutOfScope(Url),
    /// Could not be resolved; dropped silently
    Malformed,
}

impl LinkAdmission {
    /// Returns true if the link should be registered
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit(_))
    }
}

/// Runs a raw link through normalization and the scope filter
///
/// # Arguments
///
/// * `raw` - The href as extracted from the page
/// * `page` - The page the href was found on
/// * `seed_origin` - Origin of the crawl's seed URL
pub fn admit(raw: &str, page: &Url, seed_origin: &Origin) -> LinkAdmission {
    match normalize(raw, page) {
        Some(url) if in_scope(&url, seed_origin) => LinkAdmission::Admit(url),
        Some(url) => LinkAdmission::OutOfScope(url),
        None => LinkAdmission::Malformed,
    }
}
