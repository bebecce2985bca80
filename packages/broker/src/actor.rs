//! Actor owning the broker connection.
//!
//! Requests are handled one at a time, so the connection is never shared
//! between in-flight commands and callers never hold a lock across I/O.

use std::collections::HashMap;
use std::time::Duration;

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use record_core::JobId;

use crate::QueueError;
use crate::connection::Connection;

/// Messages for the BrokerActor.
#[derive(Debug)]
pub enum BrokerMessage {
    /// Put a job on a tube.
    Put {
        tube: String,
        body: Vec<u8>,
        priority: u32,
        delay: Duration,
        ttr: Duration,
        reply: RpcReplyPort<Result<JobId, QueueError>>,
    },

    /// Fetch a job's statistics.
    StatsJob {
        job_id: JobId,
        reply: RpcReplyPort<Result<HashMap<String, String>, QueueError>>,
    },
}

/// Broker actor arguments.
pub struct BrokerArgs {
    pub address: String,
    pub connection: Connection,
}

/// State for the broker actor.
pub struct BrokerState {
    address: String,
    /// Dropped after an I/O failure and reopened by the next request.
    connection: Option<Connection>,
}

impl BrokerState {
    async fn connection(&mut self) -> Result<&mut Connection, QueueError> {
        if self.connection.is_none() {
            tracing::info!("Reconnecting to beanstalkd at {}", self.address);
            self.connection = Some(Connection::open(&self.address).await?);
        }

        self.connection
            .as_mut()
            .ok_or_else(|| QueueError::Actor("connection unavailable".into()))
    }

    /// Forget a connection whose stream state can no longer be trusted.
    fn settle<T>(&mut self, result: &Result<T, QueueError>) {
        if matches!(result, Err(QueueError::Io(_) | QueueError::Protocol(_))) {
            self.connection = None;
        }
    }
}

/// Broker actor that serializes commands on one connection.
pub struct BrokerActor;

impl Actor for BrokerActor {
    type Msg = BrokerMessage;
    type State = BrokerState;
    type Arguments = BrokerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting broker actor for {}", args.address);
        Ok(BrokerState {
            address: args.address,
            connection: Some(args.connection),
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            BrokerMessage::Put {
                tube,
                body,
                priority,
                delay,
                ttr,
                reply,
            } => {
                let result = match state.connection().await {
                    Ok(conn) => conn.put(&tube, &body, priority, delay, ttr).await,
                    Err(e) => Err(e),
                };
                state.settle(&result);

                match &result {
                    Ok(job_id) => tracing::debug!(job_id = %job_id, tube = %tube, "Put job"),
                    Err(e) => tracing::debug!(tube = %tube, "Put failed: {}", e),
                }

                let _ = reply.send(result);
            }

            BrokerMessage::StatsJob { job_id, reply } => {
                let result = match state.connection().await {
                    Ok(conn) => conn.stats_job(job_id).await,
                    Err(e) => Err(e),
                };
                state.settle(&result);

                let _ = reply.send(result);
            }
        }

        Ok(())
    }
}
