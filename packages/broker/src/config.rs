use crate::QueueError;

/// Default beanstalkd address.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:11300";

/// Broker connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// `host:port` of the beanstalkd server.
    pub address: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

impl BrokerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Build a config from environment variables.
    ///
    /// - `BEANSTALK_ADDR` (default: `127.0.0.1:11300`)
    pub fn from_env() -> Result<Self, QueueError> {
        let address = std::env::var("BEANSTALK_ADDR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        match address {
            Some(address) if !address.contains(':') => Err(QueueError::InvalidConfig(format!(
                "BEANSTALK_ADDR={address} (expected host:port)"
            ))),
            Some(address) => Ok(Self::new(address)),
            None => Ok(Self::default()),
        }
    }
}
