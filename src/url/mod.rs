//! URL handling module for Rent-Scout
//!
//! This module provides URL normalization, host keys used to look up vendor
//! rules, and the path helpers the link classifier relies on.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{host_key, is_same_host};
pub use normalize::{normalize_url, parse_root, path_segments};
