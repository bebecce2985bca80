//! Repository implementations for database operations.

mod record_repo;

pub use record_repo::RecordRepository;
