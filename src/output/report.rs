use crate::output::JobResult;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;

/// One flattened line of a job report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub domain: String,
    pub make: String,
    pub model: String,
    pub url: String,
    pub price: String,
}

/// Flattens a job result into one row per (query, url, price)
///
/// Vendors are visited in key order and findings in their stored order;
/// a triple that was already emitted is skipped.
pub fn flatten_report(result: &JobResult) -> Vec<PriceRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (domain, findings) in result {
        for finding in findings {
            for price in &finding.prices {
                let key = (
                    finding.make.to_lowercase(),
                    finding.model.to_lowercase(),
                    finding.url.clone(),
                    price.clone(),
                );
                if !seen.insert(key) {
                    continue;
                }
                rows.push(PriceRow {
                    domain: domain.clone(),
                    make: finding.make.clone(),
                    model: finding.model.clone(),
                    url: finding.url.clone(),
                    price: price.clone(),
                });
            }
        }
    }

    rows
}

/// Renders report rows as a plain-text table
pub fn render_report(rows: &[PriceRow]) -> String {
    let mut out = String::new();

    if rows.is_empty() {
        out.push_str("No prices found\n");
        return out;
    }

    let price_width = rows.iter().map(|r| r.price.len()).max().unwrap_or(0).max(5);
    let car_width = rows
        .iter()
        .map(|r| r.make.len() + r.model.len() + 1)
        .max()
        .unwrap_or(0)
        .max(3);

    let _ = writeln!(out, "{:<car_width$}  {:>price_width$}  URL", "CAR", "PRICE");
    for row in rows {
        let car = format!("{} {}", row.make, row.model);
        let _ = writeln!(out, "{:<car_width$}  {:>price_width$}  {}", car, row.price, row.url);
    }

    out
}
