use crate::crawler::parser::extract_hrefs;
use crate::crawler::PageCrawler;
use crate::LinkCheckError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Enumerates links by fetching raw HTML, without running scripts
///
/// Faster than the browser renderer and script-free, but links
/// inserted by client-side scripts are missed.
#[derive(Debug, Clone)]
pub struct StaticCrawler {
    client: Client,
}

impl StaticCrawler {
    /// `client` should carry the crawl timeout rather than the probe timeout
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageCrawler for StaticCrawler {
    async fn crawl(&self, url: &Url) -> Result<Vec<String>, LinkCheckError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LinkCheckError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    LinkCheckError::Http {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkCheckError::Crawl {
                url: url.to_string(),
                message: format!("page returned HTTP {}", status.as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            tracing::debug!("{} is {}, no links to extract", url, content_type);
            return Ok(Vec::new());
        }

        // Relative links resolve against the post-redirect address
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| LinkCheckError::Http {
            url: url.to_string(),
            source: e,
        })?;

        let hrefs = extract_hrefs(&body, &final_url);
        tracing::debug!("Parsed {}: {} links", url, hrefs.len());

        Ok(hrefs)
    }
}
