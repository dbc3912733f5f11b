//! SQLite job store implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.
//! Results are stored as JSON text so any client can poll the table.

use crate::output::JobResult;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobId, JobStatus, JobStore, StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite job store backend
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Opens or creates a job database at `path`
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creation and last-update timestamps (RFC 3339) of a job
    pub fn timestamps(&self, id: &JobId) -> StoreResult<Option<(String, String)>> {
        let row = self
            .conn
            .query_row(
                "SELECT created_at, updated_at FROM jobs WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    fn finish(
        &mut self,
        id: &JobId,
        status: &str,
        result: Option<String>,
        error: Option<&str>,
    ) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE jobs SET status = ?1, result = ?2, error = ?3, updated_at = ?4 WHERE id = ?5",
            params![status, result, error, now, id.as_str()],
        )?;

        if updated == 0 {
            return Err(StoreError::JobNotFound(id.clone()));
        }
        Ok(())
    }
}

impl JobStore for SqliteJobStore {
    fn set_pending(&mut self, id: &JobId) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO jobs (id, status, result, error, created_at, updated_at)
             VALUES (?1, ?2, NULL, NULL, ?3, ?3)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                result = NULL,
                error = NULL,
                updated_at = excluded.updated_at",
            params![id.as_str(), JobStatus::Pending.to_db_string(), now],
        )?;
        Ok(())
    }

    fn set_done(&mut self, id: &JobId, result: &JobResult) -> StoreResult<()> {
        let json = serde_json::to_string(result)?;
        self.finish(id, "done", Some(json), None)
    }

    fn set_error(&mut self, id: &JobId, message: &str) -> StoreResult<()> {
        self.finish(id, "error", None, Some(message))
    }

    fn status(&self, id: &JobId) -> StoreResult<Option<JobStatus>> {
        let row: Option<(String, Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT status, result, error FROM jobs WHERE id = ?1",
                params![id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((status, result, error)) = row else {
            return Ok(None);
        };

        let status = match status.as_str() {
            "pending" => JobStatus::Pending,
            "done" => {
                let json = result.ok_or_else(|| StoreError::Corrupt {
                    id: id.clone(),
                    message: "done without a result".to_string(),
                })?;
                JobStatus::Done(serde_json::from_str(&json)?)
            }
            "error" => JobStatus::Error(error.unwrap_or_default()),
            other => {
                return Err(StoreError::Corrupt {
                    id: id.clone(),
                    message: format!("unknown status '{}'", other),
                })
            }
        };

        Ok(Some(status))
    }
}
