//! In-process job store

use crate::output::JobResult;
use crate::storage::traits::{JobId, JobStatus, JobStore, StoreError, StoreResult};
use std::collections::HashMap;

/// Job store backed by a `HashMap`; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: HashMap<JobId, JobStatus>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn update(&mut self, id: &JobId, status: JobStatus) -> StoreResult<()> {
        match self.jobs.get_mut(id) {
            Some(slot) => {
                *slot = status;
                Ok(())
            }
            None => Err(StoreError::JobNotFound(id.clone())),
        }
    }
}

impl JobStore for MemoryJobStore {
    fn set_pending(&mut self, id: &JobId) -> StoreResult<()> {
        self.jobs.insert(id.clone(), JobStatus::Pending);
        Ok(())
    }

    fn set_done(&mut self, id: &JobId, result: &JobResult) -> StoreResult<()> {
        self.update(id, JobStatus::Done(result.clone()))
    }

    fn set_error(&mut self, id: &JobId, message: &str) -> StoreResult<()> {
        self.update(id, JobStatus::Error(message.to_string()))
    }

    fn status(&self, id: &JobId) -> StoreResult<Option<JobStatus>> {
        Ok(self.jobs.get(id).cloned())
    }
}
