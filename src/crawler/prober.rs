//! HTTP liveness prober
//!
//! This module decides whether a URL is reachable:
//! - Building the HTTP client with the configured user agent and limits
//! - Sending the probe request
//! - Classifying statuses and transport errors into a [`Reachability`]

use crate::config::UserAgentConfig;
use crate::crawler::Prober;
use crate::state::{Reachability, UnreachableReason};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Whole-request timeout applied to every probe
/// * `max_redirects` - Redirect hops followed before giving up
///
/// # Example
///
/// ```no_run
/// use link_sweeper::config::UserAgentConfig;
/// use link_sweeper::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10), 10).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
    max_redirects: usize,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Probes URLs with a GET request
///
/// # Classification
///
/// | Outcome | Verdict |
/// |---------|---------|
/// | Final status 200-399 | Reachable |
/// | Any other status | Unreachable (status) |
/// | Timeout | Unreachable (timeout) |
/// | Redirect chain over the limit | Unreachable (too many redirects) |
/// | DNS, connect or TLS failure | Unreachable (connection) |
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &Url) -> Reachability {
        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                tracing::trace!("Probe {} -> {} (final {})", url, status, response.url());
                Reachability::from_status(status)
            }
            Err(e) => Reachability::Unreachable {
                reason: classify_error(&e),
            },
        }
    }
}

fn classify_error(error: &reqwest::Error) -> UnreachableReason {
    if error.is_timeout() {
        UnreachableReason::Timeout
    } else if error.is_redirect() {
        UnreachableReason::TooManyRedirects
    } else if error.is_connect() {
        UnreachableReason::Connection(root_cause(error))
    } else {
        UnreachableReason::Other(root_cause(error))
    }
}

/// reqwest's top-level message omits the underlying cause
fn root_cause(error: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = error;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober(timeout: Duration) -> HttpProber {
        let client = build_http_client(&UserAgentConfig::default(), timeout, 10).unwrap();
        HttpProber::new(client)
    }

    fn page(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5), 3);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_probe_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let verdict = prober(Duration::from_secs(5)).probe(&page(&server, "/")).await;
        assert_eq!(verdict, Reachability::Reachable { status: 200 });
    }

    #[tokio::test]
    async fn test_probe_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let verdict = prober(Duration::from_secs(5))
            .probe(&page(&server, "/missing"))
            .await;
        assert_eq!(
            verdict,
            Reachability::Unreachable {
                reason: UnreachableReason::Status(404)
            }
        );
    }

    #[tokio::test]
    async fn test_probe_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let verdict = prober(Duration::from_secs(5)).probe(&page(&server, "/x")).await;
        assert!(!verdict.is_reachable());
    }

    #[tokio::test]
    async fn test_probe_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let verdict = prober(Duration::from_secs(5)).probe(&page(&server, "/old")).await;
        assert_eq!(verdict, Reachability::Reachable { status: 200 });
    }

    #[tokio::test]
    async fn test_probe_redirect_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
            .mount(&server)
            .await;

        let verdict = prober(Duration::from_secs(5)).probe(&page(&server, "/loop")).await;
        assert_eq!(
            verdict,
            Reachability::Unreachable {
                reason: UnreachableReason::TooManyRedirects
            }
        );
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let verdict = prober(Duration::from_millis(200))
            .probe(&page(&server, "/slow"))
            .await;
        assert_eq!(
            verdict,
            Reachability::Unreachable {
                reason: UnreachableReason::Timeout
            }
        );
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

        let verdict = prober(Duration::from_secs(5)).probe(&url).await;
        assert!(matches!(
            verdict,
            Reachability::Unreachable {
                reason: UnreachableReason::Connection(_)
            }
        ));
    }
}
