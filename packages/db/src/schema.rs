//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Table holding one document per job.
pub const JOB_RECORD_TABLE: &str = "job_record";

/// Initialize the database schema.
///
/// Safe to run repeatedly; every definition is `IF NOT EXISTS`.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.query(JOB_RECORD_SCHEMA)
        .await?
        .check()
        .map_err(DbError::from_statement)?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Job record table schema.
///
/// Entries are kept schemaless; their shape is owned by `record_core`.
const JOB_RECORD_SCHEMA: &str = r#"
-- Audit trail, keyed by the queue-assigned job id
DEFINE TABLE IF NOT EXISTS job_record SCHEMALESS;

DEFINE FIELD IF NOT EXISTS jobId ON job_record TYPE int;
DEFINE FIELD IF NOT EXISTS owner ON job_record TYPE option<string>;
DEFINE FIELD IF NOT EXISTS cmd ON job_record TYPE option<string>;
DEFINE FIELD IF NOT EXISTS entries ON job_record TYPE array DEFAULT [];

-- One document per job
DEFINE INDEX IF NOT EXISTS job_record_job_id ON job_record FIELDS jobId UNIQUE;

-- Per-owner lookups
DEFINE INDEX IF NOT EXISTS job_record_owner ON job_record FIELDS owner, jobId;
"#;
