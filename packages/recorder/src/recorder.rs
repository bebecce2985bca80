//! Writes job lifecycle entries to the record store.

use db::{RecordStore, RecordUpdate};
use record_core::{JobEntry, JobId, JobRecord, JobResult};
use serde_json::Value;

use crate::RecordError;

/// Sole writer of job records.
///
/// Entries are always appended, so `entries` is in order of arrival at the
/// store. Use each entry's timestamp when logical order matters.
pub struct Recorder<S> {
    store: S,
}

impl<S: RecordStore> Recorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the store's tables and indexes if missing.
    pub async fn ensure_schema(&self) -> Result<(), RecordError> {
        Ok(self.store.ensure_schema().await?)
    }

    /// Start the audit trail of a newly enqueued job with a pending entry.
    ///
    /// Calling this twice for the same job keeps one record but appends a
    /// second pending entry; call it once per submission.
    pub async fn create_record(
        &self,
        owner: Option<String>,
        job_id: JobId,
        cmd: Option<String>,
        data: Option<Value>,
    ) -> Result<(), RecordError> {
        let update = RecordUpdate::append(JobEntry::pending())
            .with_owner(owner)
            .with_cmd(cmd)
            .with_data(data);

        self.store.upsert(job_id, update).await?;
        Ok(())
    }

    /// Append the entry for a worker-reported outcome.
    ///
    /// If the job has no record yet, one is created holding just this entry.
    /// Reporting the same outcome twice appends it twice.
    pub async fn update_record(&self, result: &JobResult) -> Result<(), RecordError> {
        let entry = JobEntry::from_result(result);
        tracing::debug!(job_id = %result.job_id, status = %entry.status(), "Recording job outcome");

        self.store
            .upsert(result.job_id, RecordUpdate::append(entry))
            .await?;
        Ok(())
    }

    /// Fetch the record of one job.
    pub async fn record(&self, job_id: JobId) -> Result<Option<JobRecord>, RecordError> {
        Ok(self.store.find(job_id).await?)
    }

    /// All records submitted by `owner`, ordered by job id.
    pub async fn records_for_owner(&self, owner: &str) -> Result<Vec<JobRecord>, RecordError> {
        Ok(self.store.find_by_owner(owner).await?)
    }
}
