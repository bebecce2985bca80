//! The record store capability.

use std::future::Future;

use record_core::{JobEntry, JobId, JobRecord};
use serde_json::Value;

use crate::DbError;

/// A single-document mutation applied by [`RecordStore::upsert`].
///
/// Fields that are `Some` are set; `push` is appended to `entries` in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub owner: Option<String>,
    pub cmd: Option<String>,
    pub data: Option<Value>,
    pub push: Vec<JobEntry>,
}

impl RecordUpdate {
    /// An update that only appends one entry.
    pub fn append(entry: JobEntry) -> Self {
        Self {
            push: vec![entry],
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_cmd(mut self, cmd: Option<String>) -> Self {
        self.cmd = cmd;
        self
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Apply to an in-memory record.
    pub fn apply(self, record: &mut JobRecord) {
        if self.owner.is_some() {
            record.owner = self.owner;
        }
        if self.cmd.is_some() {
            record.cmd = self.cmd;
        }
        if self.data.is_some() {
            record.data = self.data;
        }
        record.entries.extend(self.push);
    }
}

/// Persistence for job records.
///
/// `upsert` must be atomic per document: the matched (or newly created)
/// record gets its fields set and its entries appended in one mutation, so
/// concurrent appends for the same job never lose an entry.
pub trait RecordStore: Send + Sync {
    /// Create tables and indexes if missing.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Apply `update` to the record for `job_id`, creating it if absent.
    fn upsert(
        &self,
        job_id: JobId,
        update: RecordUpdate,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fetch the record for `job_id`.
    fn find(&self, job_id: JobId) -> impl Future<Output = Result<Option<JobRecord>, DbError>> + Send;

    /// Fetch all records tagged with `owner`, ordered by job id.
    fn find_by_owner(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<JobRecord>, DbError>> + Send;
}
