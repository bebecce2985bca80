use record_core::JobId;

/// Queue errors.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rejected by queue: {0}")]
    Rejected(String),

    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job stats unavailable: {0}")]
    StatsUnavailable(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid tube name: {0:?}")]
    InvalidTube(String),

    #[error("Actor error: {0}")]
    Actor(String),

    #[error("Invalid broker config: {0}")]
    InvalidConfig(String),
}
