//! Core domain types for the job audit trail.
//!
//! This crate contains shared types used across all packages:
//! - JobId and JobResult for queue jobs and worker outcomes
//! - JobRecord and JobEntry for the persisted lifecycle history

mod job;
mod record;

pub use job::{JobId, JobResult, UnixMillis};
pub use record::{EntryStatus, JobEntry, JobRecord, derive_exit_code, derive_status};
