//! SurrealDB integration for the job audit trail.
//!
//! This crate provides database connectivity, the [`RecordStore`]
//! capability, and two implementations of it: [`RecordRepository`] on
//! SurrealDB and [`MemoryRecordStore`] for tests.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod memory;
mod schema;
mod store;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect};
pub use memory::MemoryRecordStore;
pub use repositories::RecordRepository;
pub use schema::{JOB_RECORD_TABLE, init_schema};
pub use store::{RecordStore, RecordUpdate};

/// Connect with the given configuration and make sure the schema exists.
pub async fn init(config: &DbConfig) -> Result<RecordRepository, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(RecordRepository::new(db))
}
