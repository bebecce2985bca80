//! Beanstalkd client for submitting jobs.
//!
//! This crate provides the [`JobQueue`] capability and a beanstalkd-backed
//! implementation of it.
//!
//! # Architecture
//!
//! - `Connection` - One TCP connection speaking the beanstalk text protocol
//! - `BrokerActor` - Owns the connection and handles one command at a time
//! - `Broker` - Cloneable handle that sends requests to the actor
//! - `JobStatsReader` - Reads a job's priority back from the queue
//!
//! # Usage
//!
//! ```ignore
//! use broker::{Broker, BrokerConfig, JobQueue};
//!
//! let (broker, _handle) = Broker::connect(&BrokerConfig::default()).await?;
//! let id = broker.put("default", body, 1024, Duration::ZERO, Duration::from_secs(60)).await?;
//! ```

mod actor;
mod config;
mod connection;
mod error;
pub mod protocol;
mod queue;
mod stats;

pub use actor::{BrokerActor, BrokerMessage};
pub use config::{BrokerConfig, DEFAULT_ADDRESS};
pub use connection::Connection;
pub use error::QueueError;
pub use queue::{Broker, JobQueue};
pub use stats::{JobStatsReader, parse_priority};
