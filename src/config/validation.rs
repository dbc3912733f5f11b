use crate::config::types::{Config, EngineConfig, FetchConfig, UserAgentConfig, VendorEntry};
use crate::url::{host_key, parse_root};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_vendors(&config.vendors)?;
    Ok(())
}

fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > 500 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 500, got {}",
            config.max_concurrency
        )));
    }

    if config.max_pages_per_domain == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages_per_domain must be >= 1 when set".to_string(),
        ));
    }

    if config.job_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "job_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.base_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "base_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates vendor entries and rejects two vendors sharing a host
fn validate_vendors(vendors: &[VendorEntry]) -> Result<(), ConfigError> {
    let mut hosts = HashSet::new();

    for vendor in vendors {
        let root = parse_root(&vendor.root).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid vendor root '{}': {}", vendor.root, e))
        })?;

        let host = host_key(&root).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("Vendor root '{}' has no host", vendor.root))
        })?;

        if !hosts.insert(host.clone()) {
            return Err(ConfigError::Validation(format!(
                "Host '{}' is configured more than once",
                host
            )));
        }

        if vendor.path_prefixes.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Vendor '{}' must have at least one path prefix",
                vendor.root
            )));
        }

        for prefix in vendor
            .path_prefixes
            .iter()
            .chain(&vendor.excluded_path_prefixes)
        {
            validate_prefix(prefix, &vendor.root)?;
        }

        validate_selector(&vendor.price_selector)?;

        if vendor.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(format!(
                "Vendor '{}' timeout_secs must be >= 1",
                vendor.root
            )));
        }
    }

    Ok(())
}

fn validate_prefix(prefix: &str, root: &str) -> Result<(), ConfigError> {
    if !prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "Path prefix '{}' of vendor '{}' must start with '/'",
            prefix, root
        )));
    }
    Ok(())
}

pub(crate) fn validate_selector(selector: &str) -> Result<Selector, ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: "selector cannot be empty".to_string(),
        });
    }

    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
