use broker::QueueError;
use db::DbError;
use record_core::JobId;

/// Errors from writing or reading the audit trail.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<DbError> for RecordError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Constraint(msg) => RecordError::ConstraintViolation(msg),
            other => RecordError::StoreUnavailable(other),
        }
    }
}

/// Errors from registering a job.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The payload could not be serialized; the queue was not contacted.
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The queue refused the job; nothing was recorded.
    #[error("Enqueue failed: {0}")]
    EnqueueFailed(#[from] QueueError),

    /// The job is on the queue but its audit record could not be written.
    #[error("Job {job_id} enqueued but not recorded: {source}")]
    Unrecorded { job_id: JobId, source: RecordError },
}

impl RegisterError {
    /// The id of a job that was enqueued despite the error.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            RegisterError::Unrecorded { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }
}

/// Errors from wiring up a producer.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}
