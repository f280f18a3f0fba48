//! State module for tracking crawl progress
//!
//! This module provides the per-link state machine and the probe verdicts
//! recorded against each link.
//!
//! # Components
//!
//! - `LinkState`: Tracks where a link is in its probe/crawl lifecycle
//! - `Reachability`: The outcome of a liveness probe
//! - `UnreachableReason`: Why a probe classified a link as broken

mod link_state;
mod reachability;

// Re-export main types
pub use link_state::LinkState;
pub use reachability::{Reachability, UnreachableReason};
