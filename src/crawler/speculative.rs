//! Speculative direct lookup
//!
//! Many vendors publish listings at `<prefix><slug>/`. Before paying for a
//! full traversal, the engine probes those URLs directly; the traversal is
//! skipped only when a probe returns a real price.

use crate::output::Finding;
use crate::query::CarQuery;
use crate::rules::DomainRule;
use std::collections::HashSet;
use url::Url;

/// Builds the candidate detail-page URLs for every query
///
/// One candidate per (prefix, slug) pair, using both the `make-model` slug
/// and the model-only slug. Order follows prefixes, then queries; repeats
/// are dropped.
///
/// # Example
///
/// ```
/// use rent_scout::config::Config;
/// use rent_scout::crawler::candidate_urls;
/// use rent_scout::{CarQuery, RuleTable};
///
/// let table = RuleTable::from_config(&Config::builtin().unwrap()).unwrap();
/// let rule = table.lookup("superiorrental.ae").unwrap();
/// let urls = candidate_urls(&rule.root, rule, &[CarQuery::new("BMW", "X5").unwrap()]);
/// assert_eq!(urls[0].as_str(), "https://superiorrental.ae/cars/bmw-x5/");
/// assert_eq!(urls[1].as_str(), "https://superiorrental.ae/cars/x5/");
/// ```
pub fn candidate_urls(root: &Url, rule: &DomainRule, queries: &[CarQuery]) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for prefix in &rule.path_prefixes {
        let mut base = prefix.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        for query in queries {
            for slug in [query.full_slug(), query.model_slug()] {
                if slug.is_empty() {
                    continue;
                }

                let path = format!("{}{}/", base, slug);
                match root.join(&path) {
                    Ok(url) => {
                        if seen.insert(url.clone()) {
                            candidates.push(url);
                        }
                    }
                    Err(e) => tracing::debug!("Skipping candidate {}: {}", path, e),
                }
            }
        }
    }

    candidates
}

/// Decides whether probe findings resolve the vendor
///
/// Returns the findings when at least one carries a real price; otherwise
/// `None`, and the caller falls back to traversal.
pub fn resolve(findings: Vec<Finding>) -> Option<Vec<Finding>> {
    if findings.iter().any(Finding::is_priced) {
        Some(findings)
    } else {
        None
    }
}
