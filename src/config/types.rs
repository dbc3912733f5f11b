use crate::rules::PriceCleaner;
use serde::Deserialize;

/// Main configuration structure for Rent-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(rename = "vendor", default)]
    pub vendors: Vec<VendorEntry>,
}

impl Config {
    /// Roots of every enabled vendor, in configuration order
    pub fn domains(&self) -> Vec<String> {
        self.vendors
            .iter()
            .filter(|v| v.enabled)
            .map(|v| v.root.clone())
            .collect()
    }
}

/// Crawl engine limits and switches
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Number of traversal batches before the crawl stops
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of in-flight fetches per domain
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Optional cap on traversal pages fetched per domain
    #[serde(rename = "max-pages-per-domain", default)]
    pub max_pages_per_domain: Option<u32>,

    /// Probe slug-built URLs before falling back to traversal
    #[serde(rename = "speculative-lookup", default = "default_true")]
    pub speculative_lookup: bool,

    /// Optional deadline for a whole job, in seconds
    #[serde(rename = "job-timeout-secs", default)]
    pub job_timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_concurrency: default_max_concurrency(),
            max_pages_per_domain: None,
            speculative_lookup: true,
            job_timeout_secs: None,
        }
    }
}

/// Retry and timeout policy for page fetches
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Attempts per URL, including the first one
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt timeout when the vendor has no override
    #[serde(rename = "base-timeout-secs", default = "default_base_timeout")]
    pub base_timeout_secs: u64,

    /// Pause between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_timeout_secs: default_base_timeout(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "RentScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/rent-scout/rent-scout".to_string(),
        }
    }
}

/// One rental vendor: where it lives and how to read its prices
#[derive(Debug, Clone, Deserialize)]
pub struct VendorEntry {
    /// Site root the crawl starts from (e.g. "https://mkrentacar.com/")
    pub root: String,

    /// Path prefixes under which detail pages live
    #[serde(rename = "path-prefixes")]
    pub path_prefixes: Vec<String>,

    /// Path prefixes never followed (e.g. localized mirrors)
    #[serde(rename = "excluded-path-prefixes", default)]
    pub excluded_path_prefixes: Vec<String>,

    /// CSS selector matching price elements on a detail page
    #[serde(rename = "price-selector")]
    pub price_selector: String,

    #[serde(rename = "price-cleaner", default)]
    pub price_cleaner: PriceCleaner,

    /// Per-attempt timeout override for slow vendors
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_concurrency() -> u32 {
    50
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_timeout() -> u64 {
    20
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}
