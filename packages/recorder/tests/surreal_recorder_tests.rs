#![allow(clippy::disallowed_methods)]

use std::error::Error;
use std::sync::Arc;

use db::{DbConfig, DbError};
use recorder::init::connect_recorder;
use recorder::{EntryStatus, JobId, JobResult, RecordError, RecorderConfig};
use serde_json::json;

fn memory_config() -> RecorderConfig {
    RecorderConfig {
        db: DbConfig::memory(),
        ..Default::default()
    }
}

#[tokio::test]
async fn lifecycle_on_surrealdb() -> Result<(), Box<dyn Error>> {
    let recorder = connect_recorder(&memory_config()).await?;
    let id = JobId(31);

    recorder
        .create_record(
            Some("42".into()),
            id,
            Some("resize".into()),
            Some(json!({ "w": 640 })),
        )
        .await?;
    recorder
        .update_record(&JobResult::timed_out(id).with_error("ttr exceeded"))
        .await?;
    recorder
        .update_record(&JobResult::executed(id, 0))
        .await?;

    let record = recorder.record(id).await?.ok_or("record missing")?;
    let statuses: Vec<_> = record.entries.iter().map(|e| e.status()).collect();
    assert_eq!(
        statuses,
        vec![EntryStatus::Pending, EntryStatus::TimedOut, EntryStatus::Executed]
    );
    assert_eq!(record.entries[1].exit_code(), None);
    assert_eq!(record.entries[1].error(), Some("ttr exceeded"));
    assert_eq!(record.entries[2].exit_code(), Some(0));
    assert_eq!(record.data, Some(json!({ "w": 640 })));
    Ok(())
}

#[tokio::test]
async fn buried_execution_has_no_exit_code() -> Result<(), Box<dyn Error>> {
    let recorder = connect_recorder(&memory_config()).await?;
    let id = JobId(32);

    let mut result = JobResult::executed(id, 1);
    result.buried = true;
    recorder.update_record(&result).await?;

    let record = recorder.record(id).await?.ok_or("record missing")?;
    assert_eq!(record.entries.len(), 1);
    assert_eq!(record.entries[0].status(), EntryStatus::Buried);
    assert_eq!(record.entries[0].exit_code(), None);
    Ok(())
}

#[tokio::test]
async fn owner_listing_on_surrealdb() -> Result<(), Box<dyn Error>> {
    let recorder = connect_recorder(&memory_config()).await?;

    for (owner, id) in [("a", 3), ("b", 1), ("a", 2)] {
        recorder
            .create_record(Some(owner.into()), JobId(id), None, None)
            .await?;
    }
    // an outcome without a record has no owner
    recorder.update_record(&JobResult::buried(JobId(4))).await?;

    let ids: Vec<_> = recorder
        .records_for_owner("a")
        .await?
        .into_iter()
        .map(|r| r.job_id)
        .collect();
    assert_eq!(ids, vec![JobId(2), JobId(3)]);
    assert!(recorder.records_for_owner("nobody").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn schema_can_be_ensured_again() -> Result<(), Box<dyn Error>> {
    let recorder = connect_recorder(&memory_config()).await?;

    recorder.ensure_schema().await?;
    recorder
        .create_record(None, JobId(5), None, None)
        .await?;
    recorder.ensure_schema().await?;

    assert!(recorder.record(JobId(5)).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn duplicate_job_row_is_a_constraint_violation() -> Result<(), Box<dyn Error>> {
    let recorder = connect_recorder(&memory_config()).await?;

    recorder
        .store()
        .database()
        .query("CREATE job_record:stray SET jobId = 6, entries = []")
        .await?
        .check()?;

    let err = recorder.update_record(&JobResult::buried(JobId(6))).await;
    assert!(matches!(err, Err(RecordError::ConstraintViolation(_))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_outcomes_are_all_recorded() -> Result<(), Box<dyn Error>> {
    let recorder = Arc::new(connect_recorder(&memory_config()).await?);
    let id = JobId(77);

    recorder
        .create_record(Some("42".into()), id, None, None)
        .await?;

    let mut tasks = Vec::new();
    for code in 0..40 {
        let recorder = recorder.clone();
        tasks.push(tokio::spawn(async move {
            recorder.update_record(&JobResult::executed(id, code)).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let record = recorder.record(id).await?.ok_or("record missing")?;
    assert_eq!(record.entries.len(), 41);
    assert_eq!(record.entries[0].status(), EntryStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn unstorable_job_id_is_reported() -> Result<(), Box<dyn Error>> {
    let recorder = connect_recorder(&memory_config()).await?;
    let id = JobId((1 << 63) + 5);

    let err = recorder
        .create_record(Some("o".into()), id, None, None)
        .await;
    assert!(
        matches!(err, Err(RecordError::StoreUnavailable(DbError::InvalidKey(_)))),
        "{err:?}"
    );
    assert!(recorder.record(id).await?.is_none());
    Ok(())
}
