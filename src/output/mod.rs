//! Result aggregation and reporting
//!
//! This module handles:
//! - The `Finding` record produced for every matched detail page
//! - Merging per-vendor results into a job result
//! - Flattening a job result into a deduplicated price report

mod findings;
mod report;

pub use findings::{domain_result, merge_findings, merge_results, Finding, JobResult, NO_PRICE};
pub use report::{flatten_report, render_report, PriceRow};
