//! Job runner: records a job's lifecycle in a job store
//!
//! The engine itself is a pure function of (queries, domains). The runner
//! wraps it with an id, a pending record, an optional deadline and a final
//! done/error record.

use crate::crawler::Engine;
use crate::query::{prepare_queries, CarQuery};
use crate::storage::traits::{JobId, JobStatus, JobStore, StoreError, StoreResult};
use crate::ScoutError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Shared handle to a job store
pub type SharedJobStore = Arc<Mutex<dyn JobStore + Send>>;

/// Runs jobs on an engine and records their status
#[derive(Clone)]
pub struct JobRunner {
    engine: Engine,
    store: SharedJobStore,
    deadline: Option<Duration>,
}

impl JobRunner {
    /// Creates a runner using the engine's configured job timeout
    pub fn new(engine: Engine, store: SharedJobStore) -> Self {
        let deadline = engine.job_timeout();
        Self {
            engine,
            store,
            deadline,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn store(&self) -> SharedJobStore {
        Arc::clone(&self.store)
    }

    /// Current status of a job
    pub fn status(&self, id: &JobId) -> StoreResult<Option<JobStatus>> {
        self.with_store(|store| store.status(id))
    }

    /// Runs a job to completion and returns its id
    ///
    /// Invalid queries are rejected before a job is recorded. Once recorded,
    /// crawl failures end up in the store as an error status; only store
    /// failures are returned here.
    pub async fn run(
        &self,
        queries: &[CarQuery],
        domains: &[String],
    ) -> Result<JobId, ScoutError> {
        let queries = prepare_queries(queries)?;
        let id = JobId::generate();
        self.with_store(|store| store.set_pending(&id))?;

        self.execute(&id, &queries, domains).await?;
        Ok(id)
    }

    /// Records a job as pending and runs it in the background
    ///
    /// The id can be polled through [`JobRunner::status`] right away.
    pub fn submit(
        &self,
        queries: Vec<CarQuery>,
        domains: Vec<String>,
    ) -> Result<(JobId, JoinHandle<()>), ScoutError> {
        let queries = prepare_queries(&queries)?;
        let id = JobId::generate();
        self.with_store(|store| store.set_pending(&id))?;

        let runner = self.clone();
        let job_id = id.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = runner.execute(&job_id, &queries, &domains).await {
                tracing::error!("Failed to record job {}: {}", job_id, e);
            }
        });

        Ok((id, handle))
    }

    async fn execute(
        &self,
        id: &JobId,
        queries: &[CarQuery],
        domains: &[String],
    ) -> StoreResult<()> {
        tracing::info!("Job {} started", id);

        let outcome = match self.deadline {
            Some(deadline) => {
                self.engine
                    .run_job_with_deadline(queries, domains, deadline)
                    .await
            }
            None => self.engine.run_job(queries, domains).await,
        };

        match outcome {
            Ok(result) => {
                tracing::info!("Job {} done with {} vendors", id, result.len());
                self.with_store(|store| store.set_done(id, &result))
            }
            Err(e) => {
                tracing::error!("Job {} failed: {}", id, e);
                self.with_store(|store| store.set_error(id, &e.to_string()))
            }
        }
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut (dyn JobStore + Send)) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut store = self.store.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut *store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{build_http_client, CrawlLimits, Fetcher, RetryPolicy};
    use crate::config::UserAgentConfig;
    use crate::rules::RuleTable;
    use crate::storage::MemoryJobStore;

    fn runner() -> JobRunner {
        let client = build_http_client(&UserAgentConfig::default()).unwrap();
        let engine = Engine::new(
            RuleTable::default(),
            Fetcher::new(client, RetryPolicy::default()),
            CrawlLimits::default(),
        );
        JobRunner::new(engine, Arc::new(Mutex::new(MemoryJobStore::new())))
    }

    #[tokio::test]
    async fn test_run_records_done() {
        let runner = runner();
        let queries = [CarQuery::new("BMW", "X5").unwrap()];
        let id = runner
            .run(&queries, &["https://unsupported.example.com/".to_string()])
            .await
            .unwrap();

        assert_eq!(
            runner.status(&id).unwrap(),
            Some(JobStatus::Done(Default::default()))
        );
    }

    #[tokio::test]
    async fn test_invalid_query_not_recorded() {
        let runner = runner();
        let queries = [CarQuery {
            make: "BMW".to_string(),
            model: " ".to_string(),
        }];
        let result = runner.run(&queries, &[]).await;
        assert!(matches!(result, Err(ScoutError::Query(_))));
    }

    #[tokio::test]
    async fn test_submit_runs_in_background() {
        let runner = runner();
        let (id, handle) = runner
            .submit(vec![CarQuery::new("BMW", "X5").unwrap()], vec![])
            .unwrap();

        assert!(runner.status(&id).unwrap().is_some());
        handle.await.unwrap();
        assert!(runner.status(&id).unwrap().unwrap().is_finished());
    }
}
