use crate::UrlError;
use url::Url;

/// Resolves a raw link against the page it was found on and canonicalizes it
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Resolve `raw` against `base` (absolute links ignore the base)
/// 3. Remove fragment (everything after #)
///
/// Two links that differ only by fragment therefore map to the same canonical
/// URL. Host lowercasing and dot-segment removal come from the `url` crate's
/// WHATWG parser.
///
/// # Arguments
///
/// * `raw` - The href as it appeared on the page
/// * `base` - The URL of the page the href was found on
///
/// # Returns
///
/// * `Some(Url)` - The canonical absolute URL
/// * `None` - The link is malformed and should be skipped silently
///
/// # Examples
///
/// ```
/// use link_sweeper::url::normalize;
/// use url::Url;
///
/// let base = Url::parse("https://a.test/docs/").unwrap();
/// let url = normalize("../about#team", &base).unwrap();
/// assert_eq!(url.as_str(), "https://a.test/about");
/// ```
pub fn normalize(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();

    let mut url = match base.join(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Skipping malformed link {:?} on {}: {}", raw, base, e);
            return None;
        }
    };

    url.set_fragment(None);
    Some(url)
}

/// Parses and validates the seed URL given on the command line
///
/// The seed must be an absolute `http` or `https` URL with a host. Its fragment
/// is removed so the seed record uses the same canonical form as every link
/// discovered later.
///
/// # Arguments
///
/// * `raw` - The seed URL string
///
/// # Returns
///
/// * `Ok(Url)` - Canonical seed URL
/// * `Err(UrlError)` - The seed cannot be crawled
pub fn parse_seed(raw: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
