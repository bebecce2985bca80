//! Database connection management.

use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect as connect_any};
use surrealdb::opt::auth::Root;
use thiserror::Error;

/// Database connection handle; cloning it shares the underlying connection.
pub type Database = Surreal<Any>;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection endpoint: "mem://", "rocksdb://path", "ws://host:port", ...
    pub endpoint: String,
    /// Namespace to use
    pub namespace: String,
    /// Database name to use
    pub database: String,
    /// Optional root credentials for authentication
    pub credentials: Option<(String, String)>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            namespace: "gonfalon".to_string(),
            database: "jobs".to_string(),
            credentials: None,
        }
    }
}

impl DbConfig {
    /// Create a config for in-memory testing.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Create a config for RocksDB persistence (requires rocksdb feature).
    pub fn rocksdb(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("rocksdb://{}", path.into()),
            ..Default::default()
        }
    }

    /// Create a config for a remote server endpoint.
    pub fn remote(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set root credentials for authentication.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Build a config from environment variables.
    ///
    /// - `RECORDER_DB_ENDPOINT` (default: `mem://`)
    /// - `RECORDER_DB_NAMESPACE` (default: `gonfalon`)
    /// - `RECORDER_DB_DATABASE` (default: `jobs`)
    /// - `RECORDER_DB_USER`, `RECORDER_DB_PASSWORD` (optional; both or neither)
    pub fn from_env() -> Result<Self, DbError> {
        let mut config = Self::default();

        if let Some(endpoint) = env_var("RECORDER_DB_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(namespace) = env_var("RECORDER_DB_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Some(database) = env_var("RECORDER_DB_DATABASE") {
            config.database = database;
        }

        match (env_var("RECORDER_DB_USER"), env_var("RECORDER_DB_PASSWORD")) {
            (Some(user), Some(password)) => config = config.with_credentials(user, password),
            (None, None) => {}
            _ => {
                return Err(DbError::InvalidConfig(
                    "RECORDER_DB_USER and RECORDER_DB_PASSWORD must be set together".into(),
                ));
            }
        }

        Ok(config)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(#[from] surrealdb::Error),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    /// A concurrent transaction touched the same document; safe to retry.
    #[error("Write conflict: {0}")]
    Conflict(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid database config: {0}")]
    InvalidConfig(String),
}

impl DbError {
    /// Classify an error returned by a statement, separating unique-index
    /// conflicts and retryable transaction conflicts from everything else.
    pub(crate) fn from_statement(err: surrealdb::Error) -> Self {
        let message = err.to_string();

        let constraint = matches!(
            &err,
            surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. })
        ) || message.contains("already contains");
        if constraint {
            return DbError::Constraint(message);
        }

        let conflict = matches!(&err, surrealdb::Error::Db(surrealdb::error::Db::TxRetryable))
            || message.contains("read or write conflict")
            || message.contains("can be retried");
        if conflict {
            return DbError::Conflict(message);
        }

        DbError::Connection(err)
    }
}

/// Open a database connection.
///
/// The returned handle is meant to be injected into a store and cloned per
/// operation; nothing is kept in process-wide state.
pub async fn connect(config: &DbConfig) -> Result<Database, DbError> {
    tracing::info!("Connecting to database: {}", config.endpoint);

    let db = connect_any(config.endpoint.as_str()).await?;

    if let Some((username, password)) = &config.credentials {
        db.signin(Root { username, password }).await?;
    }

    db.use_ns(&config.namespace).use_db(&config.database).await?;

    tracing::info!(
        "Connected to database: {}/{}",
        config.namespace,
        config.database
    );

    Ok(db)
}
