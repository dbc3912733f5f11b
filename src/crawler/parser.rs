//! HTML parsing for link discovery and price extraction
//!
//! Traversal pages only need their links. Detail pages are run through the
//! vendor's price selector and cleaner, then paired with the queries whose
//! slugs appear in the page path.
//!
//! `scraper::Html` is not `Send`, so every function here parses and drops the
//! document synchronously; callers never hold a document across an await.

use crate::output::Finding;
use crate::query::{matches, CarQuery};
use crate::rules::DomainRule;
use crate::url::normalize_url;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts every followable link from a page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`, resolved against the page URL, fragment removed
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that is not HTTP(S) after resolution
///
/// Host filtering is left to the caller.
///
/// # Example
///
/// ```
/// use rent_scout::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/cars/bmw-x5/#top">X5</a><a href="tel:123">Call</a>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &page);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/cars/bmw-x5/");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, page_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL, or `None` if it should be skipped
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    normalize_url(href, base_url).ok()
}

/// Applies the vendor's price selector and cleaner to a document
///
/// Empty results are dropped and duplicates collapse into the set.
pub fn extract_prices(document: &Html, rule: &DomainRule) -> BTreeSet<String> {
    document
        .select(&rule.price_selector)
        .filter_map(|element| {
            let text: String = element.text().collect();
            rule.price_cleaner.clean(&text)
        })
        .collect()
}

/// Builds one finding per query whose slug appears in the page path
///
/// Prices are extracted once and shared by all matching queries; a match
/// with no price gets `{"N/A"}`.
pub fn scrape_detail_page(
    document: &Html,
    url: &Url,
    rule: &DomainRule,
    domain: &str,
    queries: &[CarQuery],
) -> Vec<Finding> {
    let path = url.path();
    let matched: Vec<&CarQuery> = queries.iter().filter(|q| matches(path, q)).collect();

    if matched.is_empty() {
        return Vec::new();
    }

    let prices = extract_prices(document, rule);

    matched
        .into_iter()
        .map(|query| {
            let finding = Finding::new(query, domain, url.as_str(), prices.clone());
            tracing::info!(
                "Matched {} {} with prices {:?} at {}",
                finding.make,
                finding.model,
                finding.prices,
                url
            );
            finding
        })
        .collect()
}

/// Parses raw HTML and runs [`scrape_detail_page`] on it
pub fn scrape_detail_html(
    html: &str,
    url: &Url,
    rule: &DomainRule,
    domain: &str,
    queries: &[CarQuery],
) -> Vec<Finding> {
    let document = Html::parse_document(html);
    scrape_detail_page(&document, url, rule, domain, queries)
}
