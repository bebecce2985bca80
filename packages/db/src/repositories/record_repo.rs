//! Job record repository backed by SurrealDB.

use std::time::Duration;

use record_core::{JobId, JobRecord};
use serde_json::Value;

use crate::schema::{JOB_RECORD_TABLE, init_schema};
use crate::{Database, DbError, RecordStore, RecordUpdate};

/// Record fields, leaving out the SurrealDB record id.
const RECORD_FIELDS: &str = "jobId, owner, cmd, data, entries";

/// Attempts at an upsert that keeps losing transaction conflicts.
const MAX_UPSERT_ATTEMPTS: u32 = 100;
const CONFLICT_BACKOFF_MS: u64 = 1;
const MAX_CONFLICT_BACKOFF_MS: u64 = 20;

/// Repository for job record persistence.
///
/// Holds a shared connection and takes its own clone of it per operation.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    db: Database,
}

/// SurrealDB integers are signed, so job ids above `i64::MAX` have no key.
fn record_key(job_id: JobId) -> Result<i64, DbError> {
    i64::try_from(job_id.as_u64()).map_err(|_| {
        DbError::InvalidKey(format!("job id {job_id} exceeds the largest storable id {}", i64::MAX))
    })
}

impl RecordRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying connection handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn lease(&self) -> Database {
        self.db.clone()
    }

    /// Run one upsert statement, classifying its failure.
    async fn upsert_once(
        &self,
        query: &str,
        key: i64,
        bindings: &[(&'static str, Value)],
    ) -> Result<(), DbError> {
        let db = self.lease();

        let mut request = db
            .query(query)
            .bind(("table", JOB_RECORD_TABLE))
            .bind(("job_id", key));

        for (name, value) in bindings {
            request = request.bind((*name, value.clone()));
        }

        request
            .await
            .map_err(DbError::from_statement)?
            .check()
            .map_err(DbError::from_statement)?;

        Ok(())
    }
}

impl RecordStore for RecordRepository {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        init_schema(&self.lease()).await
    }

    async fn upsert(&self, job_id: JobId, update: RecordUpdate) -> Result<(), DbError> {
        let key = record_key(job_id)?;

        let mut assignments = vec!["jobId = $job_id"];
        let mut bindings: Vec<(&'static str, Value)> = Vec::new();

        if let Some(owner) = update.owner {
            assignments.push("owner = $owner");
            bindings.push(("owner", Value::String(owner)));
        }

        if let Some(cmd) = update.cmd {
            assignments.push("cmd = $cmd");
            bindings.push(("cmd", Value::String(cmd)));
        }

        if let Some(data) = update.data {
            assignments.push("data = $data");
            bindings.push(("data", data));
        }

        // Appended server-side so concurrent writers never overwrite each other.
        assignments.push("entries = array::concat(entries ?? [], $entries)");
        let entries = serde_json::to_value(&update.push)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        bindings.push(("entries", entries));

        let query = format!(
            "UPSERT type::thing($table, $job_id) SET {} RETURN NONE",
            assignments.join(", ")
        );

        // A statement that loses a transaction conflict committed nothing, so
        // running it again cannot append twice.
        let mut attempt = 1;
        loop {
            match self.upsert_once(&query, key, &bindings).await {
                Ok(()) => break,
                Err(DbError::Conflict(reason)) if attempt < MAX_UPSERT_ATTEMPTS => {
                    tracing::debug!(job_id = %job_id, attempt, "Upsert conflicted, retrying: {}", reason);
                    let backoff = (CONFLICT_BACKOFF_MS * u64::from(attempt)).min(MAX_CONFLICT_BACKOFF_MS);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(job_id = %job_id, appended = update.push.len(), attempt, "Upserted job record");

        Ok(())
    }

    async fn find(&self, job_id: JobId) -> Result<Option<JobRecord>, DbError> {
        // no record can exist under an id that has no key
        let Ok(key) = record_key(job_id) else {
            return Ok(None);
        };
        let db = self.lease();

        let mut result = db
            .query(format!("SELECT {RECORD_FIELDS} FROM type::thing($table, $job_id)"))
            .bind(("table", JOB_RECORD_TABLE))
            .bind(("job_id", key))
            .await?;

        let records: Vec<JobRecord> = result.take(0)?;

        Ok(records.into_iter().next())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<JobRecord>, DbError> {
        let db = self.lease();

        let mut result = db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) WHERE owner = $owner ORDER BY jobId ASC"
            ))
            .bind(("table", JOB_RECORD_TABLE))
            .bind(("owner", owner.to_string()))
            .await?;

        let records: Vec<JobRecord> = result.take(0)?;

        Ok(records)
    }
}
