use db::{DbConfig, DbError, RecordRepository};

/// A repository on a fresh in-memory database with the schema applied.
pub async fn setup_repository() -> Result<RecordRepository, DbError> {
    db::init(&DbConfig::memory()).await
}
