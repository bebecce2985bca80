//! Job submission with a durable audit trail.
//!
//! - [`Producer`] puts a job on the queue and records its submission
//! - [`Recorder`] appends lifecycle entries as workers report outcomes
//!
//! Both are generic over their collaborators ([`broker::JobQueue`] and
//! [`db::RecordStore`]), so tests can swap in in-memory versions.

mod config;
mod error;
pub mod init;
mod producer;
mod recorder;

pub use config::RecorderConfig;
pub use error::{InitError, RecordError, RegisterError};
pub use producer::Producer;
pub use recorder::Recorder;

// Re-export core types for convenience
pub use record_core::{EntryStatus, JobEntry, JobId, JobRecord, JobResult, UnixMillis};
