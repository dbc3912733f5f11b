//! Extraction rule table
//!
//! Per-vendor rules telling the crawler which paths hold detail pages, which
//! paths to ignore, where prices sit in the document, and how to clean them.
//! The table is built once from configuration and only read afterwards, so
//! crawl tasks share it through an `Arc` without locking.

mod cleaner;

pub use cleaner::PriceCleaner;

use crate::config::validation::validate_selector;
use crate::config::{Config, VendorEntry};
use crate::url::{host_key, parse_root};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Extraction rule for one vendor
#[derive(Debug, Clone)]
pub struct DomainRule {
    /// Host key the rule is stored under (see [`host_key`])
    pub host: String,

    /// Site root the vendor is crawled from
    pub root: Url,

    /// Detail-page path prefixes, in configuration order
    pub path_prefixes: Vec<String>,

    /// Path prefixes that are never followed
    pub excluded_path_prefixes: Vec<String>,

    /// Raw selector text, kept for logging
    pub price_selector_text: String,

    pub price_selector: Selector,

    pub price_cleaner: PriceCleaner,

    /// Per-attempt timeout replacing the fetcher's base timeout
    pub request_timeout_override: Option<Duration>,
}

impl DomainRule {
    /// Builds a rule from a vendor entry, parsing its selector
    pub fn from_entry(entry: &VendorEntry) -> Result<Self, ConfigError> {
        let root = parse_root(&entry.root).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid vendor root '{}': {}", entry.root, e))
        })?;
        let host = host_key(&root).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("Vendor root '{}' has no host", entry.root))
        })?;

        Ok(Self {
            host,
            root,
            path_prefixes: entry.path_prefixes.clone(),
            excluded_path_prefixes: entry.excluded_path_prefixes.clone(),
            price_selector_text: entry.price_selector.clone(),
            price_selector: validate_selector(&entry.price_selector)?,
            price_cleaner: entry.price_cleaner,
            request_timeout_override: entry.timeout_secs.map(Duration::from_secs),
        })
    }

    /// Whether a path falls under one of the excluded prefixes
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Read-only map from host key to vendor rule
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, DomainRule>,
}

impl RuleTable {
    /// Builds the table from every vendor in the configuration
    ///
    /// Disabled vendors still get a rule; they are only left out of the
    /// default domain list.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::from_entries(&config.vendors)
    }

    pub fn from_entries(entries: &[VendorEntry]) -> Result<Self, ConfigError> {
        let mut rules = HashMap::with_capacity(entries.len());
        for entry in entries {
            let rule = DomainRule::from_entry(entry)?;
            if rules.contains_key(&rule.host) {
                return Err(ConfigError::Validation(format!(
                    "Host '{}' is configured more than once",
                    rule.host
                )));
            }
            rules.insert(rule.host.clone(), rule);
        }
        Ok(Self { rules })
    }

    /// Looks up the rule for an exact host key
    ///
    /// `None` means the vendor is unsupported; callers skip it.
    pub fn lookup(&self, host: &str) -> Option<&DomainRule> {
        self.rules.get(host)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the rules in host order
    pub fn iter(&self) -> impl Iterator<Item = &DomainRule> {
        let mut rules: Vec<&DomainRule> = self.rules.values().collect();
        rules.sort_by(|a, b| a.host.cmp(&b.host));
        rules.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(root: &str) -> VendorEntry {
        VendorEntry {
            root: root.to_string(),
            path_prefixes: vec!["/cars/".to_string()],
            excluded_path_prefixes: vec!["/ru/".to_string()],
            price_selector: "span.price".to_string(),
            price_cleaner: PriceCleaner::FirstToken,
            timeout_secs: Some(40),
            enabled: true,
        }
    }

    #[test]
    fn test_lookup_exact_host() {
        let table = RuleTable::from_entries(&[entry("https://ferrorental.com/")]).unwrap();

        let rule = table.lookup("ferrorental.com").unwrap();
        assert_eq!(rule.host, "ferrorental.com");
        assert_eq!(rule.request_timeout_override, Some(Duration::from_secs(40)));

        assert!(table.lookup("www.ferrorental.com").is_none());
        assert!(table.lookup("https://ferrorental.com/").is_none());
    }

    #[test]
    fn test_excluded_prefix() {
        let rule = DomainRule::from_entry(&entry("https://ferrorental.com/")).unwrap();
        assert!(rule.is_excluded("/ru/rent/sport/ferrari/"));
        assert!(!rule.is_excluded("/rent/sport/ferrari/"));
    }

    #[test]
    fn test_bad_selector_rejected() {
        let mut bad = entry("https://ferrorental.com/");
        bad.price_selector = ":::".to_string();
        assert!(matches!(
            DomainRule::from_entry(&bad),
            Err(ConfigError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_duplicate_host_rejected() {
        let entries = [entry("https://a.example.com/"), entry("https://a.example.com/x")];
        assert!(RuleTable::from_entries(&entries).is_err());
    }

    #[test]
    fn test_builtin_table() {
        let config = Config::builtin().unwrap();
        let table = RuleTable::from_config(&config).unwrap();
        assert_eq!(table.len(), 11);

        let mk = table.lookup("mkrentacar.com").unwrap();
        assert_eq!(mk.path_prefixes.len(), 6);
        assert_eq!(mk.price_cleaner, PriceCleaner::FirstTokenStripCommas);

        let selya = table.lookup("www.selyarentacar.com").unwrap();
        assert_eq!(selya.path_prefixes, vec!["/".to_string()]);

        let ferro = table.lookup("ferrorental.com").unwrap();
        assert_eq!(ferro.price_cleaner, PriceCleaner::TokenAtIndex(1));
        assert!(ferro.is_excluded("/ru/"));
    }
}
