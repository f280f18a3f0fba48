//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! end-to-end with the static renderer.

use link_sweeper::config::{load_config, Config, Overrides, Renderer};
use link_sweeper::crawler::{run_crawl, Coordinator};
use link_sweeper::output::{format_markdown_report, write_markdown_report};
use link_sweeper::UnreachableReason;
use std::collections::HashMap;
use std::io::Write;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Default configuration switched to the static renderer
fn create_test_config(concurrency: u32) -> Config {
    Config::default()
        .with_overrides(Overrides {
            concurrency: Some(concurrency),
            renderer: Some(Renderer::Static),
            probe_timeout_secs: Some(5),
            crawl_timeout_secs: Some(5),
            ..Overrides::default()
        })
        .expect("test config is valid")
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

/// Number of requests the server received, per path
async fn requests_by_path(server: &MockServer) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for request in server.received_requests().await.unwrap_or_default() {
        *counts.entry(request.url.path().to_string()).or_default() += 1;
    }
    counts
}

#[tokio::test]
async fn test_full_crawl_reports_broken_link_with_source() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let seed = format!("{}/", site.uri());

    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="/about">About</a>
               <a href="/missing#section">Missing</a>
               <a href="{}/elsewhere">External</a>"#,
            external.uri()
        ),
    )
    .await;
    mount_page(&site, "/about", r#"<a href="/">Home</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let report = run_crawl(create_test_config(5), &seed).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.active, 2);
    assert_eq!(report.inactive, 1);

    let broken = &report.broken[0];
    assert_eq!(broken.url.as_str(), format!("{}/missing", site.uri()));
    assert_eq!(broken.source.as_ref().map(|u| u.as_str()), Some(seed.as_str()));
    assert_eq!(broken.reason, UnreachableReason::Status(404));

    // Other origins are never contacted
    assert!(external
        .received_requests()
        .await
        .unwrap_or_default()
        .is_empty());
}

#[tokio::test]
async fn test_unreachable_seed_is_probed_but_not_crawled() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;

    let report = run_crawl(create_test_config(3), &site.uri()).await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.inactive, 1);
    assert_eq!(report.broken[0].source, None);

    // One probe, no crawl request
    assert_eq!(requests_by_path(&site).await.get("/"), Some(&1));
}

#[tokio::test]
async fn test_cyclic_site_terminates_and_visits_each_page_once() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&site, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#).await;
    mount_page(&site, "/b", r#"<a href="/a#top">A</a><a href="/c">C</a>"#).await;
    mount_page(&site, "/c", r#"<a href="/">Home</a><a href="/a">A</a>"#).await;

    let report = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        run_crawl(create_test_config(4), &site.uri()),
    )
    .await
    .expect("crawl did not terminate")
    .unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.active, 4);
    assert!(!report.has_broken_links());

    // Every page is probed once and fetched for links once
    let requests = requests_by_path(&site).await;
    for page in ["/", "/a", "/b", "/c"] {
        assert_eq!(requests.get(page), Some(&2), "requests for {}", page);
    }
}

#[tokio::test]
async fn test_redirected_page_is_reachable() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&site)
        .await;
    // Relative link resolves against the post-redirect address
    mount_page(&site, "/new/", r#"<a href="child">Child</a>"#).await;
    mount_page(&site, "/new/child", "").await;

    let report = run_crawl(create_test_config(2), &site.uri()).await.unwrap();

    assert_eq!(report.inactive, 0);
    // /, /old, /new/child: the redirect target itself is never linked directly
    assert_eq!(report.total, 3);
}

#[tokio::test]
async fn test_slow_page_is_broken_link() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/slow">Slow</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&site)
        .await;

    let config = Config::default()
        .with_overrides(Overrides {
            renderer: Some(Renderer::Static),
            probe_timeout_secs: Some(1),
            ..Overrides::default()
        })
        .unwrap();

    let report = run_crawl(config, &site.uri()).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.inactive, 1);
    assert_eq!(report.broken[0].reason, UnreachableReason::Timeout);
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let site = MockServer::start().await;

    // Requests with any other user agent fall through to wiremock's 404
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "sweeper-test/9.9"))
        .respond_with(html_page(r#"<a href="/gone">Gone</a>"#))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .and(header("user-agent", "sweeper-test/9.9"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&site)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[crawler]
concurrency = 2
renderer = "static"
probe-timeout-secs = 5

[user-agent]
name = "sweeper-test"
version = "9.9"
"#,
    )
    .unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    let report = Coordinator::new(config, &site.uri())
        .unwrap()
        .with_config_hash(Some("cafebabe".to_string()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.active, 1);
    assert_eq!(report.broken[0].reason, UnreachableReason::Status(410));
    assert_eq!(report.config_hash.as_deref(), Some("cafebabe"));
}

#[tokio::test]
async fn test_markdown_summary_written_after_crawl() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<a href="/nope">Nope</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let report = run_crawl(create_test_config(2), &site.uri()).await.unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let summary_path = dir.path().join("summary.md");
    write_markdown_report(&report, &summary_path).unwrap();

    let written = std::fs::read_to_string(&summary_path).unwrap();
    assert_eq!(written, format_markdown_report(&report));
    assert!(written.contains(&format!("{}/nope", site.uri())));
    assert!(written.contains("HTTP 404"));
}

#[tokio::test]
async fn test_invalid_seed_fails_before_crawling() {
    assert!(run_crawl(create_test_config(1), "mailto:team@a.test")
        .await
        .is_err());
    assert!(run_crawl(create_test_config(1), "/relative/path").await.is_err());
}

#[tokio::test]
async fn test_only_anchors_are_followed() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><head>
                         <link rel="canonical" href="/canon">
                         <link rel="stylesheet" href="/style.css">
                       </head><body><p>No anchors here</p></body></html>"#,
                    "text/html",
                ),
        )
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/canon"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let report = run_crawl(create_test_config(2), &site.uri()).await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.inactive, 0);
    assert!(!requests_by_path(&site).await.contains_key("/canon"));
}
