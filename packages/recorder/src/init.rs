//! Wiring a producer to its queue and store.

use broker::Broker;
use db::RecordRepository;
use ractor::concurrency::JoinHandle;

use crate::{InitError, Producer, Recorder, RecorderConfig};

/// A producer backed by beanstalkd and SurrealDB.
pub type DefaultProducer = Producer<Broker, RecordRepository>;

/// Connect to the store and the queue.
///
/// The schema is created if missing. The returned handle completes when the
/// broker actor stops.
pub async fn connect(config: &RecorderConfig) -> Result<(DefaultProducer, JoinHandle<()>), InitError> {
    tracing::info!("Initializing job producer...");

    let store = db::init(&config.db).await?;
    let (broker, handle) = Broker::connect(&config.broker).await?;

    tracing::info!("Job producer initialized");
    Ok((Producer::new(broker, Recorder::new(store)), handle))
}

/// Connect a recorder alone, for processes that only report outcomes.
pub async fn connect_recorder(config: &RecorderConfig) -> Result<Recorder<RecordRepository>, InitError> {
    let store = db::init(&config.db).await?;
    Ok(Recorder::new(store))
}
