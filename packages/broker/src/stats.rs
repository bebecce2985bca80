//! Reading a job's priority back from the queue.

use std::collections::HashMap;

use record_core::JobId;

use crate::{JobQueue, QueueError};

/// Extract the `pri` field of a stats dictionary.
pub fn parse_priority(stats: &HashMap<String, String>) -> Result<u32, QueueError> {
    let raw = stats
        .get("pri")
        .ok_or_else(|| QueueError::StatsUnavailable("missing \"pri\" field".into()))?;

    raw.trim()
        .parse()
        .map_err(|e| QueueError::StatsUnavailable(format!("bad \"pri\" value {raw:?}: {e}")))
}

/// Reads per-job statistics from a queue.
pub struct JobStatsReader<Q> {
    queue: Q,
}

impl<Q: JobQueue> JobStatsReader<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    /// Current priority of a job.
    ///
    /// A job the queue no longer knows about is reported as
    /// [`QueueError::StatsUnavailable`].
    pub async fn priority_of(&self, job_id: JobId) -> Result<u32, QueueError> {
        let stats = self.queue.stats_of(job_id).await.map_err(|e| match e {
            QueueError::NotFound(id) => QueueError::StatsUnavailable(format!("job {id} not found")),
            other => other,
        })?;

        parse_priority(&stats)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct StaticStats(Option<HashMap<String, String>>);

    impl JobQueue for StaticStats {
        async fn put(
            &self,
            _tube: &str,
            _body: Vec<u8>,
            _priority: u32,
            _delay: Duration,
            _ttr: Duration,
        ) -> Result<JobId, QueueError> {
            Err(QueueError::Rejected("read-only".into()))
        }

        async fn stats_of(&self, job_id: JobId) -> Result<HashMap<String, String>, QueueError> {
            self.0.clone().ok_or(QueueError::NotFound(job_id))
        }
    }

    fn stats(pri: &str) -> HashMap<String, String> {
        HashMap::from([("pri".to_string(), pri.to_string())])
    }

    #[test]
    fn parses_priority() {
        assert_eq!(parse_priority(&stats("1024")).ok(), Some(1024));
        assert_eq!(parse_priority(&stats("4294967295")).ok(), Some(u32::MAX));

        for bad in ["not-a-number", "-1", "4294967296", ""] {
            assert!(
                matches!(parse_priority(&stats(bad)), Err(QueueError::StatsUnavailable(_))),
                "{bad}"
            );
        }

        let missing = HashMap::from([("tube".to_string(), "default".to_string())]);
        assert!(matches!(parse_priority(&missing), Err(QueueError::StatsUnavailable(_))));
    }

    #[tokio::test]
    async fn priority_of_job() -> Result<(), QueueError> {
        let reader = JobStatsReader::new(StaticStats(Some(stats("10"))));
        assert_eq!(reader.priority_of(JobId(1)).await?, 10);

        let reader = JobStatsReader::new(StaticStats(None));
        let err = reader.priority_of(JobId(1)).await;
        assert!(matches!(err, Err(QueueError::StatsUnavailable(_))));
        Ok(())
    }
}
