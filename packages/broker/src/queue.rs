//! The work-queue capability and its beanstalkd-backed handle.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use ractor::concurrency::{JoinHandle, oneshot};
use ractor::{Actor, ActorRef};
use record_core::JobId;

use crate::actor::{BrokerActor, BrokerArgs, BrokerMessage};
use crate::connection::Connection;
use crate::{BrokerConfig, QueueError};

/// Operations this crate needs from a work-queue service.
pub trait JobQueue: Send + Sync {
    /// Put `body` on `tube` and return the queue-assigned job id.
    fn put(
        &self,
        tube: &str,
        body: Vec<u8>,
        priority: u32,
        delay: Duration,
        ttr: Duration,
    ) -> impl Future<Output = Result<JobId, QueueError>> + Send;

    /// The queue's statistics for a job, as string key/value pairs.
    fn stats_of(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<HashMap<String, String>, QueueError>> + Send;
}

/// Handle to a running [`BrokerActor`]. Cheap to clone.
#[derive(Clone)]
pub struct Broker {
    actor: ActorRef<BrokerMessage>,
}

impl Broker {
    /// Connect to beanstalkd and start the actor owning the connection.
    pub async fn connect(config: &BrokerConfig) -> Result<(Self, JoinHandle<()>), QueueError> {
        let connection = Connection::open(&config.address).await?;
        let args = BrokerArgs {
            address: config.address.clone(),
            connection,
        };

        let (actor, handle) = Actor::spawn(None, BrokerActor, args)
            .await
            .map_err(|e| QueueError::Actor(format!("Failed to spawn broker: {}", e)))?;

        Ok((Self { actor }, handle))
    }

    /// Stop the actor, closing the connection.
    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

impl JobQueue for Broker {
    async fn put(
        &self,
        tube: &str,
        body: Vec<u8>,
        priority: u32,
        delay: Duration,
        ttr: Duration,
    ) -> Result<JobId, QueueError> {
        let (tx, rx) = oneshot();
        self.actor
            .send_message(BrokerMessage::Put {
                tube: tube.to_string(),
                body,
                priority,
                delay,
                ttr,
                reply: tx.into(),
            })
            .map_err(|e| QueueError::Actor(format!("Failed to send message: {}", e)))?;

        rx.await
            .map_err(|_| QueueError::Actor("Failed to receive response".into()))?
    }

    async fn stats_of(&self, job_id: JobId) -> Result<HashMap<String, String>, QueueError> {
        let (tx, rx) = oneshot();
        self.actor
            .send_message(BrokerMessage::StatsJob {
                job_id,
                reply: tx.into(),
            })
            .map_err(|e| QueueError::Actor(format!("Failed to send message: {}", e)))?;

        rx.await
            .map_err(|_| QueueError::Actor("Failed to receive response".into()))?
    }
}
