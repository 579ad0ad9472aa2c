//! Store settings and repository construction.
//!
//! Settings are read from `TASKLINK_*` environment variables:
//!
//! ```text
//! TASKLINK_BACKEND=postgres
//! TASKLINK_URL=postgres://batch@localhost/batch
//! TASKLINK_MAX_CONNECTIONS=10
//! TASKLINK_CONNECTION_TIMEOUT_SECS=30
//! ```
//!
//! When nothing is set the in-memory backend is selected.

use crate::task_resource::{
    adapters::{memory::InMemoryTaskResourceRepository, postgres::PostgresTaskResourceRepository},
    ports::TaskResourceRepository,
};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable prefix for store settings.
pub const ENV_PREFIX: &str = "TASKLINK";

/// Backing store selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on shutdown.
    #[default]
    Memory,
    /// `PostgreSQL` through an r2d2 connection pool.
    Postgres,
}

/// Settings for opening a task-resource repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Which backend to open.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Connection URL, required for [`StoreBackend::Postgres`].
    #[serde(default)]
    pub url: Option<String>,
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_connection_timeout_secs() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: None,
            max_connections: default_max_connections(),
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }
}

/// Errors raised while loading settings or opening a store.
#[derive(Debug, Error)]
pub enum StoreConfigError {
    /// Settings could not be read or deserialized.
    #[error("failed to load store settings: {0}")]
    Load(#[from] config::ConfigError),

    /// Settings were read but are not usable.
    #[error("invalid store settings: {0}")]
    Invalid(String),

    /// The connection pool could not be created.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

impl StoreConfig {
    /// Creates settings for a `PostgreSQL` store with default pool sizing.
    #[must_use]
    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            backend: StoreBackend::Postgres,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Loads settings from `TASKLINK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::Load`] when a variable cannot be parsed
    /// into the expected type.
    pub fn from_env() -> Result<Self, StoreConfigError> {
        Self::load(environment())
    }

    fn load(source: config::Environment) -> Result<Self, StoreConfigError> {
        let settings = config::Config::builder().add_source(source).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Checks the settings for the selected backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::Invalid`] when `PostgreSQL` is selected
    /// without a URL, or when the pool size or timeout is zero.
    pub fn validate(&self) -> Result<(), StoreConfigError> {
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }
        if self.url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            return Err(StoreConfigError::Invalid(
                "postgres backend requires a non-empty url".to_owned(),
            ));
        }
        if self.max_connections == 0 {
            return Err(StoreConfigError::Invalid(
                "max_connections must be at least 1".to_owned(),
            ));
        }
        if self.connection_timeout_secs == 0 {
            return Err(StoreConfigError::Invalid(
                "connection_timeout_secs must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

/// Opens the repository selected by `settings`.
///
/// Building the `PostgreSQL` pool dials the database and blocks for up to
/// `connection_timeout_secs`. Call it before entering async code or from
/// `tokio::task::spawn_blocking`.
///
/// # Errors
///
/// Returns [`StoreConfigError::Invalid`] for unusable settings and
/// [`StoreConfigError::Pool`] when the database cannot be reached.
pub fn connect(
    settings: &StoreConfig,
) -> Result<Arc<dyn TaskResourceRepository>, StoreConfigError> {
    settings.validate()?;
    match settings.backend {
        StoreBackend::Memory => {
            info!("using in-memory task resource store");
            Ok(Arc::new(InMemoryTaskResourceRepository::new()))
        }
        StoreBackend::Postgres => {
            let url = settings.url.clone().unwrap_or_default();
            let pool = Pool::builder()
                .max_size(settings.max_connections)
                .connection_timeout(Duration::from_secs(settings.connection_timeout_secs))
                .build(ConnectionManager::<PgConnection>::new(url))?;
            info!(
                max_connections = settings.max_connections,
                "connected task resource store to PostgreSQL"
            );
            Ok(Arc::new(PostgresTaskResourceRepository::new(pool)))
        }
    }
}
