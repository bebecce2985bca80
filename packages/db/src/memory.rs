//! In-process record store.

use std::collections::BTreeMap;
use std::sync::Arc;

use record_core::{JobId, JobRecord};
use tokio::sync::Mutex;

use crate::{DbError, RecordStore, RecordUpdate};

/// A [`RecordStore`] kept in memory; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<BTreeMap<JobId, JobRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn upsert(&self, job_id: JobId, update: RecordUpdate) -> Result<(), DbError> {
        let mut records = self.records.lock().await;
        let record = records
            .entry(job_id)
            .or_insert_with(|| JobRecord::new(job_id));
        update.apply(record);
        Ok(())
    }

    async fn find(&self, job_id: JobId) -> Result<Option<JobRecord>, DbError> {
        Ok(self.records.lock().await.get(&job_id).cloned())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<JobRecord>, DbError> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .filter(|r| r.owner.as_deref() == Some(owner))
            .cloned()
            .collect())
    }
}
