//! Job store trait and error types
//!
//! This module defines the interface the job runner writes job status
//! through, and the status record that pollers read back.

use crate::output::JobResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during job store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Corrupt job record {id}: {message}")]
    Corrupt { id: JobId, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Job store lock poisoned")]
    Poisoned,
}

/// Result type for job store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a job as seen by a poller
///
/// Serialises as `{"status":"pending"}`, `{"status":"done","result":{...}}`
/// or `{"status":"error","result":"message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Done(JobResult),
    Error(String),
}

impl JobStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done(_) => "done",
            Self::Error(_) => "error",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Trait for job store backends
///
/// The store is written at job start and at job completion or failure, and
/// read by whoever polls the job id.
pub trait JobStore {
    /// Registers a job as pending, resetting any previous record for the id
    fn set_pending(&mut self, id: &JobId) -> StoreResult<()>;

    /// Marks a known job as finished with its result
    fn set_done(&mut self, id: &JobId, result: &JobResult) -> StoreResult<()>;

    /// Marks a known job as failed
    fn set_error(&mut self, id: &JobId, message: &str) -> StoreResult<()>;

    /// Current status, or `None` for an unknown id
    fn status(&self, id: &JobId) -> StoreResult<Option<JobStatus>>;
}
