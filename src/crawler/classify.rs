//! Link classification against a vendor rule

use crate::rules::DomainRule;
use crate::state::LinkClass;
use crate::url::path_segments;
use url::Url;

/// Whether a URL looks like a detail page for the given prefixes
///
/// The path must start with a prefix, and unless that prefix is the root
/// `/`, the path needs at least two non-empty segments. This keeps category
/// index pages such as `/cars/` out of the detail set.
pub fn is_detail_page(url: &Url, prefixes: &[String]) -> bool {
    let path = url.path();
    let segment_count = path_segments(url).len();

    prefixes
        .iter()
        .filter(|prefix| path.starts_with(prefix.as_str()))
        .any(|prefix| prefix == "/" || segment_count >= 2)
}

/// Sorts a same-host link into excluded, detail page or frontier
pub fn classify_link(url: &Url, rule: &DomainRule) -> LinkClass {
    if rule.is_excluded(url.path()) {
        LinkClass::Excluded
    } else if is_detail_page(url, &rule.path_prefixes) {
        LinkClass::DetailPage
    } else {
        LinkClass::Frontier
    }
}
