//! Probe verdicts recorded against each link

use serde::Serialize;
use std::fmt;

/// Why a link was classified as unreachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnreachableReason {
    /// The server answered with a status outside [200, 400)
    Status(u16),

    /// No answer before the probe timeout elapsed
    Timeout,

    /// Connection refused, DNS failure, TLS failure
    Connection(String),

    /// The redirect chain exceeded the configured limit
    TooManyRedirects,

    /// Any other transport failure
    Other(String),

    /// The worker failed before the probe produced a verdict
    Aborted,
}

impl fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "timed out"),
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::TooManyRedirects => write!(f, "too many redirects"),
            Self::Other(msg) => write!(f, "{}", msg),
            Self::Aborted => write!(f, "aborted before probe completed"),
        }
    }
}

/// Outcome of a liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Reachability {
    /// The URL answered with a status in [200, 400)
    Reachable { status: u16 },

    /// The URL is broken
    Unreachable { reason: UnreachableReason },
}

impl Reachability {
    /// Classifies an HTTP status code
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Self::Reachable { status }
        } else {
            Self::Unreachable {
                reason: UnreachableReason::Status(status),
            }
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert!(!Reachability::from_status(199).is_reachable());
        assert!(Reachability::from_status(200).is_reachable());
        assert!(Reachability::from_status(301).is_reachable());
        assert!(Reachability::from_status(399).is_reachable());
        assert!(!Reachability::from_status(400).is_reachable());
        assert!(!Reachability::from_status(500).is_reachable());
    }

    #[test]
    fn test_not_found_reason() {
        assert_eq!(
            Reachability::from_status(404),
            Reachability::Unreachable {
                reason: UnreachableReason::Status(404)
            }
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(UnreachableReason::Status(404).to_string(), "HTTP 404");
        assert_eq!(UnreachableReason::Timeout.to_string(), "timed out");
    }
}
