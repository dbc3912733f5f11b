use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a vendor root URL, accepting only absolute HTTP(S) URLs with a host
pub fn parse_root(root: &str) -> UrlResult<Url> {
    let url = Url::parse(root.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves `href` against `base` and strips the fragment
///
/// This is the only normalization the crawl applies: the path, query and
/// trailing slash are kept as the vendor wrote them, because detail-page
/// prefixes and slugs are matched against the raw path.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use rent_scout::url::normalize_url;
///
/// let base = Url::parse("https://example.com/cars/").unwrap();
/// let url = normalize_url("bmw-x5/#gallery", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/cars/bmw-x5/");
/// ```
pub fn normalize_url(href: &str, base: &Url) -> UrlResult<Url> {
    let mut url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}

/// Non-empty path segments of a URL
pub fn path_segments(url: &Url) -> Vec<&str> {
    url.path().split('/').filter(|s| !s.is_empty()).collect()
}
