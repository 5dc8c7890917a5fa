//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! Checkout waits at most the configured timeout; a pool that cannot hand out
//! a connection surfaces as [`PoolError::Checkout`], which repositories map to
//! their connection error so the HTTP layer answers 503.

use std::fmt;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use url::Url;

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures acquiring or building the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Connection settings for [`DbPool`].
///
/// The database URL usually embeds a password, so `Debug` prints it with the
/// password masked.
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Pool of up to 10 connections with a 5 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// The URL with any password replaced by `***`.
    pub fn redacted_url(&self) -> String {
        match Url::parse(&self.database_url) {
            Ok(mut url) if url.password().is_some() => {
                if url.set_password(Some("***")).is_err() {
                    return "<unprintable database url>".to_owned();
                }
                url.into()
            }
            Ok(url) => url.into(),
            Err(_) => "<unparseable database url>".to_owned(),
        }
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &self.redacted_url())
            .field("max_size", &self.max_size)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections are opened lazily on checkout.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when bb8 rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        tracing::info!(
            database_url = %config.redacted_url(),
            max_size = config.max_size,
            "database pool ready"
        );
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection becomes available
    /// within the checkout timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::with_password(
        "postgres://registry:hunter2@db:5432/registry",
        "postgres://registry:***@db:5432/registry"
    )]
    #[case::without_password("postgres://db/registry", "postgres://db/registry")]
    #[case::garbage("not a url", "<unparseable database url>")]
    fn urls_are_redacted(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(PoolConfig::new(raw).redacted_url(), expected);
    }

    #[test]
    fn debug_output_hides_the_password() {
        let config = PoolConfig::new("postgres://registry:hunter2@db/registry");
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn pool_size_is_at_least_one() {
        let config = PoolConfig::new("postgres://db/registry")
            .with_max_size(0)
            .with_connection_timeout(Duration::from_secs(1));
        assert_eq!(config.max_size, 1);
        assert_eq!(config.connection_timeout, Duration::from_secs(1));
    }
}
