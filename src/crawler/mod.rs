//! Crawler module for page fetching and price extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-vendor timeouts and retries
//! - HTML parsing for links and prices
//! - Link classification into detail pages and frontier
//! - Speculative direct lookup of slug-built URLs
//! - The engine that drives vendor crawls and whole jobs

mod classify;
mod engine;
mod fetcher;
mod parser;
mod speculative;

pub use classify::{classify_link, is_detail_page};
pub use engine::{CrawlLimits, Engine};
pub use fetcher::{build_http_client, FetchResult, FetchStatus, Fetcher, RetryPolicy};
pub use parser::{extract_links, extract_prices, scrape_detail_html, scrape_detail_page};
pub use speculative::{candidate_urls, resolve};

use crate::config::Config;
use crate::output::JobResult;
use crate::query::CarQuery;
use crate::ScoutError;

/// Runs one job against the configured vendors
///
/// This is the main entry point for a price lookup. It will:
/// 1. Build the rule table and HTTP client from `config`
/// 2. Crawl every domain in `domains` (or every enabled vendor) concurrently
/// 3. Merge the per-vendor findings into one result
///
/// The configured job timeout, if any, bounds the whole run.
pub async fn scout(
    config: &Config,
    queries: &[CarQuery],
    domains: Option<&[String]>,
) -> Result<JobResult, ScoutError> {
    let engine = Engine::from_config(config)?;
    let domains = match domains {
        Some(domains) => domains.to_vec(),
        None => config.domains(),
    };
    engine.run_configured_job(queries, &domains).await
}
