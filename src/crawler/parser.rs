//! HTML link extraction for statically fetched pages
//!
//! The browser renderer reads `anchor.href` from the live DOM, which is already
//! resolved against the document base. This module reproduces that for raw
//! HTML so both renderers hand the scheduler the same kind of strings.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every anchor href from an HTML page, in document order
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, download links included
///
/// **Exclude:**
/// - `<link>`, `<script>`, `<img>` and other non-anchor references
///
/// Hrefs are resolved against `<base href>` when the document declares one,
/// otherwise against `page_url`. An href that cannot be resolved is returned
/// verbatim; normalization drops it later. Scheme and scope filtering are not
/// done here.
///
/// # Example
///
/// ```
/// use link_sweeper::crawler::extract_hrefs;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://a.test/").unwrap();
/// assert_eq!(extract_hrefs(html, &page_url), vec!["https://a.test/page".to_string()]);
/// ```
pub fn extract_hrefs(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);
    extract_links(&document, &base)
}

/// Honors the first `<base href>` element, as browsers do
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Same selection as the browser renderer's `querySelectorAll('a[href]')`
fn extract_links(document: &Html, base: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| resolve_href(href, base))
        .collect()
}

fn resolve_href(href: &str, base: &Url) -> String {
    base.join(href.trim())
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}
