//! Job status storage
//!
//! This module handles job bookkeeping around the crawl engine, including:
//! - The `JobStore` interface and the `JobStatus` record pollers read
//! - An in-process store and a SQLite-backed store
//! - The `JobRunner` that drives a job through pending to done or error

mod memory;
mod runner;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryJobStore;
pub use runner::{JobRunner, SharedJobStore};
pub use sqlite::SqliteJobStore;
pub use traits::{JobId, JobStatus, JobStore, StoreError, StoreResult};

use std::path::Path;
use std::sync::{Arc, Mutex};

/// Opens a SQLite job store as a shared handle
pub fn open_job_store(path: &Path) -> StoreResult<SharedJobStore> {
    let store = SqliteJobStore::new(path)?;
    Ok(Arc::new(Mutex::new(store)))
}

/// Creates an empty in-process job store as a shared handle
pub fn memory_job_store() -> SharedJobStore {
    Arc::new(Mutex::new(MemoryJobStore::new()))
}
