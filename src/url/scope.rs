use url::{Origin, Url};

/// Decides whether a canonical URL belongs to the crawl
///
/// A URL is in scope when its origin (scheme, host and port) equals the seed's
/// origin. Links with opaque origins (`mailto:`, `javascript:`, `data:`) never
/// match a tuple origin and are therefore always out of scope.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_sweeper::url::in_scope;
///
/// let seed = Url::parse("https://a.test/").unwrap().origin();
/// assert!(in_scope(&Url::parse("https://a.test/about").unwrap(), &seed));
/// assert!(!in_scope(&Url::parse("https://b.test/x").unwrap(), &seed));
/// assert!(!in_scope(&Url::parse("http://a.test/").unwrap(), &seed));
/// ```
pub fn in_scope(url: &Url, seed_origin: &Origin) -> bool {
    seed_origin.is_tuple() && &url.origin() == seed_origin
}
