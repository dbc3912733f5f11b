//! Rent-Scout: rental-car price discovery across vendor websites
//!
//! This crate crawls a fixed set of rental vendors, finds the pages that
//! describe the requested cars, and extracts their prices using a per-vendor
//! rule table.

pub mod config;
pub mod crawler;
pub mod output;
pub mod query;
pub mod rules;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Rent-Scout operations
///
/// Per-page and per-domain failures never show up here; they are absorbed by
/// the crawl engine and logged.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid domain root {root}: {source}")]
    InvalidRoot { root: String, source: UrlError },

    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Job store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Job exceeded its deadline of {deadline:?}")]
    DeadlineExceeded { deadline: std::time::Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid price selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Rejections for malformed car queries
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("make is required")]
    MissingMake,

    #[error("model is required")]
    MissingModel,

    #[error("expected MAKE:MODEL, got '{0}'")]
    Malformed(String),
}

/// Result type alias for Rent-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Engine;
pub use output::{Finding, JobResult};
pub use query::CarQuery;
pub use rules::{DomainRule, PriceCleaner, RuleTable};
