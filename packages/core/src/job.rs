//! Job identity and worker-reported outcomes.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier assigned to a job by the queue service.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Parse a job ID from its decimal form.
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        Ok(Self(s.trim().parse()?))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixMillis(pub i64);

impl UnixMillis {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }
}

/// Outcome of one attempt at a job, as observed by a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobResult {
    /// The job was buried by the queue.
    pub buried: bool,
    /// The job command was executed (or attempted).
    pub executed: bool,
    /// Exit status of the command; 0 for success.
    pub exit_status: i32,
    /// Queue-assigned identifier of the job.
    pub job_id: JobId,
    /// Captured standard output of the command.
    pub stdout: Vec<u8>,
    /// The worker's own timer expired before the command finished.
    ///
    /// Tracked separately from the queue's TTR accounting.
    pub timed_out: bool,
    /// Stringified error raised while handling the job.
    pub error: Option<String>,
}

impl JobResult {
    /// An executed result with the given exit status.
    pub fn executed(job_id: JobId, exit_status: i32) -> Self {
        Self {
            executed: true,
            exit_status,
            job_id,
            ..Default::default()
        }
    }

    /// A result for a job the queue buried.
    pub fn buried(job_id: JobId) -> Self {
        Self {
            buried: true,
            job_id,
            ..Default::default()
        }
    }

    /// A result for a job whose worker timer expired.
    pub fn timed_out(job_id: JobId) -> Self {
        Self {
            timed_out: true,
            job_id,
            ..Default::default()
        }
    }

    /// Attach captured stdout.
    pub fn with_stdout(mut self, stdout: impl Into<Vec<u8>>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Attach an error, stringified.
    pub fn with_error(mut self, error: impl std::fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
