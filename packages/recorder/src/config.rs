use broker::BrokerConfig;
use db::DbConfig;

use crate::InitError;

/// Everything needed to connect a producer.
#[derive(Debug, Clone, Default)]
pub struct RecorderConfig {
    pub db: DbConfig,
    pub broker: BrokerConfig,
}

impl RecorderConfig {
    pub fn new(db: DbConfig, broker: BrokerConfig) -> Self {
        Self { db, broker }
    }

    /// Build a config from environment variables.
    ///
    /// See [`DbConfig::from_env`] and [`BrokerConfig::from_env`].
    pub fn from_env() -> Result<Self, InitError> {
        Ok(Self {
            db: DbConfig::from_env()?,
            broker: BrokerConfig::from_env()?,
        })
    }
}
