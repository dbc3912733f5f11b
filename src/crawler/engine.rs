//! Crawl engine - per-vendor crawl and job orchestration
//!
//! This module contains the crawl loop that coordinates:
//! - Looking up the vendor rule and skipping unsupported vendors
//! - Speculative direct lookup of slug-built URLs
//! - Breadth-first traversal in depth-bounded batches
//! - Concurrent fetching under a semaphore
//! - Extraction of findings from discovered detail pages
//! - Fanning a job out over vendors and merging the results

use crate::config::{Config, EngineConfig};
use crate::crawler::classify::classify_link;
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::parser::{extract_links, scrape_detail_html};
use crate::crawler::speculative::{candidate_urls, resolve};
use crate::output::{domain_result, merge_results, Finding, JobResult};
use crate::query::{prepare_queries, CarQuery};
use crate::rules::{DomainRule, RuleTable};
use crate::state::CrawlState;
use crate::url::{host_key, is_same_host, parse_root};
use crate::{ScoutError, UrlError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Bounds applied to each vendor crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Number of traversal batches
    pub max_depth: u32,

    /// In-flight fetches per vendor
    pub max_concurrency: usize,

    /// Traversal pages fetched per vendor, if capped
    pub max_pages: Option<usize>,

    /// Probe slug-built URLs before traversing
    pub speculative_lookup: bool,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_concurrency: 50,
            max_pages: None,
            speculative_lookup: true,
        }
    }
}

impl From<&EngineConfig> for CrawlLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_concurrency: config.max_concurrency.max(1) as usize,
            max_pages: config.max_pages_per_domain.map(|p| p as usize),
            speculative_lookup: config.speculative_lookup,
        }
    }
}

/// The crawl-and-extract engine
///
/// Cheap to clone: the rule table is shared and the HTTP client is
/// reference counted. Every vendor crawl gets its own `CrawlState`.
#[derive(Debug, Clone)]
pub struct Engine {
    rules: Arc<RuleTable>,
    fetcher: Fetcher,
    limits: CrawlLimits,
    job_timeout: Option<Duration>,
}

impl Engine {
    pub fn new(rules: RuleTable, fetcher: Fetcher, limits: CrawlLimits) -> Self {
        Self {
            rules: Arc::new(rules),
            fetcher,
            limits,
            job_timeout: None,
        }
    }

    /// Builds the rule table, HTTP client and limits from configuration
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let rules = RuleTable::from_config(config)?;
        let client = build_http_client(&config.user_agent)?;
        let fetcher = Fetcher::new(client, RetryPolicy::from(&config.fetch));

        let mut engine = Self::new(rules, fetcher, CrawlLimits::from(&config.engine));
        engine.job_timeout = config.engine.job_timeout_secs.map(Duration::from_secs);
        Ok(engine)
    }

    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn limits(&self) -> &CrawlLimits {
        &self.limits
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout
    }

    /// Crawls one vendor with the engine's limits
    ///
    /// Returns `{root: findings}`, or an empty map when the vendor is
    /// unsupported or nothing matched. Page failures never surface here;
    /// only a malformed root or invalid queries produce an error.
    pub async fn crawl_domain(
        &self,
        root: &str,
        queries: &[CarQuery],
    ) -> Result<JobResult, ScoutError> {
        self.crawl_domain_with(root, queries, &self.limits).await
    }

    /// Crawls one vendor with explicit limits
    pub async fn crawl_domain_with(
        &self,
        root: &str,
        queries: &[CarQuery],
        limits: &CrawlLimits,
    ) -> Result<JobResult, ScoutError> {
        let domain = root.trim().to_string();
        let mut root_url = parse_root(&domain).map_err(|source| ScoutError::InvalidRoot {
            root: domain.clone(),
            source,
        })?;
        root_url.set_fragment(None);

        let host = host_key(&root_url).ok_or_else(|| ScoutError::InvalidRoot {
            root: domain.clone(),
            source: UrlError::MissingHost,
        })?;

        let queries = prepare_queries(queries)?;
        let mut state = CrawlState::new();

        let Some(rule) = self.rules.lookup(&host) else {
            tracing::info!("No rules for {}, skipping", host);
            state.finish();
            return Ok(JobResult::new());
        };

        if queries.is_empty() {
            state.finish();
            return Ok(JobResult::new());
        }

        let rule = Arc::new(rule.clone());
        let queries = Arc::new(queries);
        let semaphore = Arc::new(Semaphore::new(limits.max_concurrency.max(1)));

        if limits.speculative_lookup {
            if let Some(findings) = self
                .direct_lookup(&root_url, &rule, &domain, &queries, &semaphore)
                .await
            {
                tracing::info!(
                    "Resolved {} by direct lookup with {} findings",
                    domain,
                    findings.len()
                );
                return Ok(domain_result(&domain, findings));
            }
        }

        state.seed(root_url);
        self.traverse(&mut state, &rule, limits, &semaphore).await;

        let detail_pages = state.begin_extraction();
        tracing::info!(
            "Processing {} discovered car pages for {}",
            detail_pages.len(),
            domain
        );
        let findings = self
            .scrape_pages(detail_pages, &rule, &domain, &queries, &semaphore)
            .await;
        state.finish();

        tracing::info!("Found {} findings on {}", findings.len(), domain);
        Ok(domain_result(&domain, findings))
    }

    /// Probes slug-built URLs; `Some` when one of them carries a real price
    async fn direct_lookup(
        &self,
        root: &Url,
        rule: &Arc<DomainRule>,
        domain: &str,
        queries: &Arc<Vec<CarQuery>>,
        semaphore: &Arc<Semaphore>,
    ) -> Option<Vec<Finding>> {
        let candidates = candidate_urls(root, rule, queries);
        tracing::debug!(
            "Probing {} direct candidates for {}",
            candidates.len(),
            domain
        );

        let findings = self
            .scrape_pages(candidates, rule, domain, queries, semaphore)
            .await;

        let resolved = resolve(findings);
        if resolved.is_none() {
            tracing::info!("Direct lookup found no prices on {}, traversing", domain);
        }
        resolved
    }

    /// Breadth-first traversal: one batch per depth level
    ///
    /// Fetches run concurrently; their links are folded into `state` by this
    /// task alone as each fetch completes.
    async fn traverse(
        &self,
        state: &mut CrawlState,
        rule: &Arc<DomainRule>,
        limits: &CrawlLimits,
        semaphore: &Arc<Semaphore>,
    ) {
        while state.should_traverse(limits.max_depth) {
            let batch = state.take_batch(limits.max_pages);
            tracing::info!(
                "[DEPTH {}] Processing {} URLs on {}",
                state.current_depth(),
                batch.len(),
                rule.host
            );

            let mut tasks = JoinSet::new();
            for url in batch {
                let fetcher = self.fetcher.clone();
                let rule = Arc::clone(rule);
                let semaphore = Arc::clone(semaphore);

                tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    let body = fetcher.fetch(&url, &rule).await.into_body()?;
                    Some(extract_links(&body, &url))
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some(links)) => {
                        for link in links {
                            if !is_same_host(&link, &rule.host) {
                                continue;
                            }
                            let class = classify_link(&link, rule);
                            state.record_link(link, class);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Traversal task failed: {}", e),
                }
            }

            state.finish_batch();
        }
    }

    /// Fetches pages concurrently and collects findings from each
    async fn scrape_pages(
        &self,
        urls: Vec<Url>,
        rule: &Arc<DomainRule>,
        domain: &str,
        queries: &Arc<Vec<CarQuery>>,
        semaphore: &Arc<Semaphore>,
    ) -> Vec<Finding> {
        let domain: Arc<str> = Arc::from(domain);
        let mut tasks = JoinSet::new();

        for url in urls {
            let fetcher = self.fetcher.clone();
            let rule = Arc::clone(rule);
            let queries = Arc::clone(queries);
            let semaphore = Arc::clone(semaphore);
            let domain = Arc::clone(&domain);

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Vec::new();
                };
                tracing::debug!("Visiting {}", url);
                match fetcher.fetch(&url, &rule).await.into_body() {
                    Some(body) => scrape_detail_html(&body, &url, &rule, &domain, &queries),
                    None => Vec::new(),
                }
            });
        }

        let mut findings = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(page_findings) => findings.extend(page_findings),
                Err(e) => tracing::error!("Exception in scrape task: {}", e),
            }
        }

        // Completion order is arbitrary; sort so repeated runs agree.
        findings.sort_by(|a, b| {
            (&a.url, &a.make, &a.model).cmp(&(&b.url, &b.make, &b.model))
        });
        findings
    }

    /// Runs a job: every vendor is crawled concurrently and the results merged
    ///
    /// Queries are validated up front. A vendor that fails contributes
    /// nothing; the job itself only fails on invalid queries.
    pub async fn run_job(
        &self,
        queries: &[CarQuery],
        domains: &[String],
    ) -> Result<JobResult, ScoutError> {
        let queries = prepare_queries(queries)?;
        tracing::info!(
            "Starting job: {} queries across {} vendors",
            queries.len(),
            domains.len()
        );

        let queries = Arc::new(queries);
        let mut tasks = JoinSet::new();

        for domain in domains {
            let engine = self.clone();
            let queries = Arc::clone(&queries);
            let domain = domain.clone();

            tasks.spawn(async move {
                let result = engine.crawl_domain(&domain, &queries).await;
                (domain, result)
            });
        }

        let mut results = Vec::with_capacity(domains.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(result))) => results.push(result),
                Ok((domain, Err(e))) => tracing::warn!("Crawl of {} failed: {}", domain, e),
                Err(e) => tracing::error!("Crawl task failed: {}", e),
            }
        }

        let merged = merge_results(results);
        tracing::info!("Job finished with results from {} vendors", merged.len());
        Ok(merged)
    }

    /// Runs a job that is abandoned once `deadline` elapses
    ///
    /// Dropping the job aborts every outstanding fetch; partial results are
    /// discarded.
    pub async fn run_job_with_deadline(
        &self,
        queries: &[CarQuery],
        domains: &[String],
        deadline: Duration,
    ) -> Result<JobResult, ScoutError> {
        match tokio::time::timeout(deadline, self.run_job(queries, domains)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Job exceeded its deadline of {:?}", deadline);
                Err(ScoutError::DeadlineExceeded { deadline })
            }
        }
    }

    /// Runs a job under the configured deadline, if any
    pub async fn run_configured_job(
        &self,
        queries: &[CarQuery],
        domains: &[String],
    ) -> Result<JobResult, ScoutError> {
        match self.job_timeout {
            Some(deadline) => self.run_job_with_deadline(queries, domains, deadline).await,
            None => self.run_job(queries, domains).await,
        }
    }
}
