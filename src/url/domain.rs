use url::Url;

/// Returns the key a vendor rule is stored under for this URL
///
/// The key is the lowercase host, followed by `:port` when the URL names a
/// non-default port. `www.` is kept: `www.example.com` and `example.com` are
/// different vendors.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use rent_scout::url::host_key;
///
/// let url = Url::parse("https://www.rotanastar.ae/car/x").unwrap();
/// assert_eq!(host_key(&url), Some("www.rotanastar.ae".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Checks whether `url` lives on the host identified by `key`
pub fn is_same_host(url: &Url, key: &str) -> bool {
    host_key(url).as_deref() == Some(key)
}
