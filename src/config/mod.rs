//! Configuration module for Rent-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A built-in configuration carrying the known vendors is compiled into the
//! binary and used when no file is given.
//!
//! # Example
//!
//! ```no_run
//! use rent_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rent-scout.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.engine.max_depth);
//! ```

mod parser;
mod types;
pub(crate) mod validation;

// Re-export types
pub use types::{Config, EngineConfig, FetchConfig, UserAgentConfig, VendorEntry};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::ConfigError;

/// Vendor table shipped with the crate
const BUILTIN_CONFIG: &str = include_str!("../../config/default.toml");

impl Config {
    /// Parses and validates the built-in vendor configuration
    pub fn builtin() -> Result<Self, ConfigError> {
        parse_config(BUILTIN_CONFIG)
    }
}
