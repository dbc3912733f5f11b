use crate::query::CarQuery;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Price placeholder for a matched page with no extractable price
pub const NO_PRICE: &str = "N/A";

/// A query matched on a vendor page, with the prices read from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub make: String,
    pub model: String,

    /// Vendor root the finding was crawled from
    pub domain: String,

    pub url: String,

    /// Never empty: `{"N/A"}` when nothing could be extracted
    pub prices: BTreeSet<String>,
}

impl Finding {
    /// Creates a finding, substituting [`NO_PRICE`] for an empty price set
    pub fn new(query: &CarQuery, domain: &str, url: &str, prices: BTreeSet<String>) -> Self {
        let prices = if prices.is_empty() {
            BTreeSet::from([NO_PRICE.to_string()])
        } else {
            prices
        };

        Self {
            make: query.make.clone(),
            model: query.model.clone(),
            domain: domain.to_string(),
            url: url.to_string(),
            prices,
        }
    }

    /// True unless the price set is exactly `{"N/A"}`
    pub fn is_priced(&self) -> bool {
        !(self.prices.len() == 1 && self.prices.contains(NO_PRICE))
    }
}

/// Final answer of a job: vendor root -> findings, empty vendors omitted
pub type JobResult = BTreeMap<String, Vec<Finding>>;

/// Wraps one vendor's findings, returning an empty result when there are none
pub fn domain_result(domain: &str, findings: Vec<Finding>) -> JobResult {
    let findings = merge_findings(findings);
    let mut result = JobResult::new();
    if !findings.is_empty() {
        result.insert(domain.to_string(), findings);
    }
    result
}

/// Collapses findings for the same (make, model, url)
///
/// First-seen order is kept. Price sets are unioned, and the `N/A`
/// placeholder is dropped once a real price is present.
pub fn merge_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    let mut merged: Vec<Finding> = Vec::with_capacity(findings.len());

    for finding in findings {
        let key = (
            finding.make.clone(),
            finding.model.clone(),
            finding.url.clone(),
        );
        match index.get(&key) {
            Some(&i) => merged[i].prices.extend(finding.prices),
            None => {
                index.insert(key, merged.len());
                merged.push(finding);
            }
        }
    }

    for finding in &mut merged {
        if finding.prices.len() > 1 {
            finding.prices.remove(NO_PRICE);
        }
    }

    merged
}

/// Merges per-vendor results into one job result
///
/// Vendors are normally disjoint keys; if one shows up twice its findings
/// are concatenated and merged.
pub fn merge_results<I>(results: I) -> JobResult
where
    I: IntoIterator<Item = JobResult>,
{
    let mut merged = JobResult::new();

    for result in results {
        for (domain, findings) in result {
            merged.entry(domain).or_default().extend(findings);
        }
    }

    merged
        .into_iter()
        .map(|(domain, findings)| (domain, merge_findings(findings)))
        .filter(|(_, findings)| !findings.is_empty())
        .collect()
}
