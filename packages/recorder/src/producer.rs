//! Enqueues jobs and starts their audit trail.

use std::time::Duration;

use broker::JobQueue;
use db::RecordStore;
use record_core::JobId;
use serde::Serialize;

use crate::{RegisterError, Recorder};

/// Puts jobs on the queue, one tube per command, and records each submission.
pub struct Producer<Q, S> {
    queue: Q,
    recorder: Recorder<S>,
}

impl<Q: JobQueue, S: RecordStore> Producer<Q, S> {
    pub fn new(queue: Q, recorder: Recorder<S>) -> Self {
        Self { queue, recorder }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn recorder(&self) -> &Recorder<S> {
        &self.recorder
    }

    /// Enqueue `payload` for `cmd` and create its pending record.
    ///
    /// On [`RegisterError::Unrecorded`] the job is already on the queue and
    /// may run; the error carries its id for reconciliation.
    pub async fn register_job<T>(
        &self,
        cmd: &str,
        owner: Option<&str>,
        priority: u32,
        delay: Duration,
        ttr: Duration,
        payload: &T,
    ) -> Result<JobId, RegisterError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(payload)?;
        let body = serde_json::to_vec(&data)?;

        let job_id = self.queue.put(cmd, body, priority, delay, ttr).await?;

        let recorded = self
            .recorder
            .create_record(
                owner.map(str::to_string),
                job_id,
                Some(cmd.to_string()),
                Some(data),
            )
            .await;

        match recorded {
            Ok(()) => {
                tracing::debug!(job_id = %job_id, cmd, "Registered job");
                Ok(job_id)
            }
            Err(source) => {
                tracing::warn!(job_id = %job_id, cmd, "Job enqueued but not recorded: {}", source);
                Err(RegisterError::Unrecorded { job_id, source })
            }
        }
    }
}
