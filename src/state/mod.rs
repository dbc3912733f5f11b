//! Per-domain crawl state
//!
//! One `CrawlState` exists per vendor per job. It is owned by a single crawl
//! invocation and only mutated between fetch batches, so it needs no locks.

mod crawl_state;

pub use crawl_state::{CrawlPhase, CrawlState, LinkClass};
