//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};

use subdomain_registry::domain::{RegistryConfig, RetryConfig};
use subdomain_registry::outbound::cloudflare::CloudflareConfig;
use subdomain_registry::outbound::github::GitHubOAuthConfig;
use subdomain_registry::outbound::persistence::DbPool;

use super::session::SessionSettings;

/// Everything the server needs, resolved once at start-up.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) registry: RegistryConfig,
    pub(crate) cloudflare: CloudflareConfig,
    pub(crate) github: GitHubOAuthConfig,
    pub(crate) retry: RetryConfig,
    pub(crate) landing_url: String,
}

/// Adapter and domain settings carried into [`ServerConfig`].
pub struct ServiceSettings {
    pub registry: RegistryConfig,
    pub cloudflare: CloudflareConfig,
    pub github: GitHubOAuthConfig,
    pub retry: RetryConfig,
    pub landing_url: String,
}

impl ServerConfig {
    /// Construct a server configuration from validated session and service
    /// settings.
    #[must_use]
    pub fn new(session: SessionSettings, services: ServiceSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        let ServiceSettings {
            registry,
            cloudflare,
            github,
            retry,
            landing_url,
        } = services;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            registry,
            cloudflare,
            github,
            retry,
            landing_url,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    ///
    /// Without one the server runs on in-memory repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
