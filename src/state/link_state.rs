//! Link state definitions for tracking crawl progress
//!
//! This module defines every state a link record can be in and which moves
//! between them are legal.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a link in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    // ===== Waiting =====
    /// Link has been registered but no worker has claimed it yet
    Pending,

    // ===== In Flight =====
    /// A worker claimed the link and is probing it
    Probing,

    /// The probe answered with a status in [200, 400)
    ProbedReachable,

    /// The probe failed or answered with a status outside [200, 400)
    ProbedUnreachable,

    /// A worker is rendering the page to enumerate its links
    Crawling,

    // ===== Terminal =====
    /// All work for this link is finished
    Done,
}

impl LinkState {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if a worker currently holds this link
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Probing | Self::ProbedReachable | Self::ProbedUnreachable | Self::Crawling
        )
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// Legal moves follow `Pending -> Probing -> ProbedReachable -> Crawling -> Done`
    /// or `Pending -> Probing -> ProbedUnreachable -> Done`. Any in-flight state may
    /// also jump straight to `Done` when a worker force-completes a record after a
    /// failure. Nothing leaves `Done`, and nothing returns to `Pending`.
    pub fn can_transition_to(&self, next: LinkState) -> bool {
        use LinkState::*;

        match (*self, next) {
            (Pending, Probing) => true,
            (Probing, ProbedReachable) | (Probing, ProbedUnreachable) => true,
            (ProbedReachable, Crawling) => true,
            (ProbedUnreachable, Done) | (Crawling, Done) => true,
            // Forced completion from any claimed state
            (from, Done) => from.is_in_flight(),
            _ => false,
        }
    }

    /// Returns a short lowercase label for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Probing => "probing",
            Self::ProbedReachable => "probed_reachable",
            Self::ProbedUnreachable => "probed_unreachable",
            Self::Crawling => "crawling",
            Self::Done => "done",
        }
    }

    /// Returns all possible link states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Probing,
            Self::ProbedReachable,
            Self::ProbedUnreachable,
            Self::Crawling,
            Self::Done,
        ]
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_reachable() {
        assert!(LinkState::Pending.can_transition_to(LinkState::Probing));
        assert!(LinkState::Probing.can_transition_to(LinkState::ProbedReachable));
        assert!(LinkState::ProbedReachable.can_transition_to(LinkState::Crawling));
        assert!(LinkState::Crawling.can_transition_to(LinkState::Done));
    }

    #[test]
    fn test_happy_path_unreachable() {
        assert!(LinkState::Probing.can_transition_to(LinkState::ProbedUnreachable));
        assert!(LinkState::ProbedUnreachable.can_transition_to(LinkState::Done));
    }

    #[test]
    fn test_unreachable_never_crawled() {
        assert!(!LinkState::ProbedUnreachable.can_transition_to(LinkState::Crawling));
    }

    #[test]
    fn test_no_return_to_pending() {
        for state in LinkState::all_states() {
            assert!(
                !state.can_transition_to(LinkState::Pending),
                "{:?} must not return to pending",
                state
            );
        }
    }

    #[test]
    fn test_done_is_final() {
        for state in LinkState::all_states() {
            assert!(!LinkState::Done.can_transition_to(state));
        }
    }

    #[test]
    fn test_no_second_probe_or_crawl() {
        assert!(!LinkState::ProbedReachable.can_transition_to(LinkState::Probing));
        assert!(!LinkState::Crawling.can_transition_to(LinkState::Crawling));
        assert!(!LinkState::Crawling.can_transition_to(LinkState::Probing));
    }

    #[test]
    fn test_forced_completion() {
        assert!(LinkState::Probing.can_transition_to(LinkState::Done));
        assert!(LinkState::ProbedReachable.can_transition_to(LinkState::Done));
        assert!(!LinkState::Pending.can_transition_to(LinkState::Done));
    }

    #[test]
    fn test_in_flight() {
        assert!(!LinkState::Pending.is_in_flight());
        assert!(LinkState::Probing.is_in_flight());
        assert!(LinkState::Crawling.is_in_flight());
        assert!(!LinkState::Done.is_in_flight());
        assert!(LinkState::Done.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", LinkState::Pending), "pending");
        assert_eq!(format!("{}", LinkState::ProbedUnreachable), "probed_unreachable");
        assert_eq!(format!("{}", LinkState::Done), "done");
    }
}
