//! Audit-trail types: one [`JobRecord`] per job, holding its [`JobEntry`] history.

use serde::{Deserialize, Serialize};

use crate::{JobId, JobResult, UnixMillis};

/// Status observed for a job at one point in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Job was submitted to the queue.
    Pending,
    /// Job command ran (its exit code may still be nonzero).
    Executed,
    /// Job was buried by the queue.
    Buried,
    /// The worker's timer expired before the job finished.
    #[serde(rename = "timedout")]
    TimedOut,
    /// The outcome carried none of the known flags.
    Unknown,
}

impl EntryStatus {
    /// Check if no further outcome is expected after this status.
    ///
    /// `Unknown` is not terminal: a later, legitimate outcome may still arrive.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntryStatus::Executed | EntryStatus::Buried | EntryStatus::TimedOut
        )
    }

    /// Get the persisted status string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Executed => "executed",
            EntryStatus::Buried => "buried",
            EntryStatus::TimedOut => "timedout",
            EntryStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a worker outcome to an entry status.
///
/// Precedence is fixed: buried, then executed, then timed out. A result that
/// is both buried and executed is reported as buried.
pub fn derive_status(result: &JobResult) -> EntryStatus {
    if result.buried {
        EntryStatus::Buried
    } else if result.executed {
        EntryStatus::Executed
    } else if result.timed_out {
        EntryStatus::TimedOut
    } else {
        EntryStatus::Unknown
    }
}

/// The exit code to persist for a worker outcome; present only for executed entries.
pub fn derive_exit_code(result: &JobResult) -> Option<i32> {
    match derive_status(result) {
        EntryStatus::Executed => Some(result.exit_status),
        _ => None,
    }
}

/// One timestamped observation in a job's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEntry {
    status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stdout: Option<Vec<u8>>,
    timestamp: UnixMillis,
}

impl JobEntry {
    /// A pending entry stamped with the current time.
    pub fn pending() -> Self {
        Self::pending_at(UnixMillis::now())
    }

    pub fn pending_at(timestamp: UnixMillis) -> Self {
        Self {
            status: EntryStatus::Pending,
            exit_code: None,
            error: None,
            stdout: None,
            timestamp,
        }
    }

    /// Build the entry for a worker outcome, stamped with the current time.
    pub fn from_result(result: &JobResult) -> Self {
        Self::from_result_at(result, UnixMillis::now())
    }

    pub fn from_result_at(result: &JobResult, timestamp: UnixMillis) -> Self {
        Self {
            status: derive_status(result),
            exit_code: derive_exit_code(result),
            error: result.error.clone().filter(|e| !e.is_empty()),
            stdout: (!result.stdout.is_empty()).then(|| result.stdout.clone()),
            timestamp,
        }
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stdout(&self) -> Option<&[u8]> {
        self.stdout.as_deref()
    }

    pub fn timestamp(&self) -> UnixMillis {
        self.timestamp
    }
}

/// The full history and metadata of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Queue-assigned identifier, unique across records.
    pub job_id: JobId,
    /// Tag correlating the job with its submitter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Command (tube) the job was submitted for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    /// Payload given at submission, opaque to this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// History in order of arrival at the store.
    #[serde(default)]
    pub entries: Vec<JobEntry>,
}

impl JobRecord {
    /// An empty record for a job.
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            owner: None,
            cmd: None,
            data: None,
            entries: Vec::new(),
        }
    }

    /// The most recent entry by timestamp; ties go to the later arrival.
    pub fn latest(&self) -> Option<&JobEntry> {
        self.entries.iter().max_by_key(|e| e.timestamp)
    }

    /// Status of the most recent entry.
    pub fn status(&self) -> Option<EntryStatus> {
        self.latest().map(JobEntry::status)
    }

    /// Check if the job has reached a terminal status.
    pub fn is_finished(&self) -> bool {
        self.status().is_some_and(|s| s.is_terminal())
    }

    /// Entries ordered by their own timestamps rather than arrival.
    pub fn chronological(&self) -> Vec<&JobEntry> {
        let mut entries: Vec<&JobEntry> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.timestamp);
        entries
    }
}
