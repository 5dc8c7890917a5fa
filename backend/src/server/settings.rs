//! Application settings loaded once at start-up via OrthoConfig.
//!
//! Every value can come from the environment (`SUBREG_*`), a config file or
//! CLI flags. Settings are converted into adapter and domain configuration
//! at composition time and never re-read afterwards.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use subdomain_registry::domain::{ParentDomain, RegistryConfig, RetryConfig};
use subdomain_registry::outbound::cloudflare::CloudflareConfig;
use subdomain_registry::outbound::github::GitHubOAuthConfig;
use subdomain_registry::outbound::persistence::PoolConfig;

pub const DEFAULT_PARENT_DOMAIN: &str = "btwarch.me";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LANDING_URL: &str = "/";
pub const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Raised when a setting is present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl SettingsError {
    fn invalid(name: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Process-wide configuration for the registry server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SUBREG")]
pub struct AppSettings {
    /// Suffix under which user subdomains are created.
    pub parent_domain: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps state in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_pool_size: Option<u32>,
    /// Cloudflare zone holding the parent domain.
    pub cloudflare_zone_id: Option<String>,
    /// Cloudflare API token with DNS edit rights on the zone.
    pub cloudflare_api_token: Option<String>,
    /// Override for the Cloudflare API root.
    pub cloudflare_api_base: Option<String>,
    /// Per-request timeout for Cloudflare calls.
    pub cloudflare_timeout_secs: Option<u64>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    /// Callback URL registered with the GitHub OAuth app.
    pub github_redirect_url: Option<String>,
    /// Where browsers go after signing in.
    pub landing_url: Option<String>,
    pub session_key_file: Option<PathBuf>,
    /// Permit a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Attempts for remote deletes, including the first.
    pub retry_max_attempts: Option<u32>,
    pub retry_initial_backoff_ms: Option<u64>,
    pub retry_max_backoff_ms: Option<u64>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|trimmed| !trimmed.is_empty())
}

impl AppSettings {
    /// Parent domain and other registry-wide rules.
    pub fn registry_config(&self) -> Result<RegistryConfig, SettingsError> {
        let raw = non_blank(self.parent_domain.as_ref()).unwrap_or(DEFAULT_PARENT_DOMAIN);
        let parent = ParentDomain::new(raw)
            .map_err(|error| SettingsError::invalid("parent_domain", raw, error))?;
        Ok(RegistryConfig::new(parent))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|error| SettingsError::invalid("bind_addr", raw, error))
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Pool settings when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url().map(|url| {
            let config = PoolConfig::new(url);
            match self.database_pool_size {
                Some(size) => config.with_max_size(size),
                None => config,
            }
        })
    }

    /// Cloudflare adapter settings. Missing credentials are reported per call.
    pub fn cloudflare_config(&self) -> Result<CloudflareConfig, SettingsError> {
        let mut config = CloudflareConfig::new(
            self.cloudflare_zone_id.clone(),
            self.cloudflare_api_token.clone(),
        )
        .map_err(|error| SettingsError::invalid("cloudflare_api_base", "", error))?;
        if let Some(base) = non_blank(self.cloudflare_api_base.as_ref()) {
            config.api_base = Url::parse(base)
                .map_err(|error| SettingsError::invalid("cloudflare_api_base", base, error))?;
        }
        if let Some(secs) = self.cloudflare_timeout_secs {
            if secs == 0 {
                return Err(SettingsError::invalid(
                    "cloudflare_timeout_secs",
                    "0",
                    "timeout must be positive",
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn github_config(&self) -> GitHubOAuthConfig {
        GitHubOAuthConfig::new(
            self.github_client_id.clone(),
            self.github_client_secret.clone(),
            self.github_redirect_url.clone(),
        )
    }

    pub fn landing_url(&self) -> &str {
        non_blank(self.landing_url.as_ref()).unwrap_or(DEFAULT_LANDING_URL)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Backoff for remote deletes; unset values keep the defaults.
    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        RetryConfig {
            max_attempts: self.retry_max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .retry_initial_backoff_ms
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: self
                .retry_max_backoff_ms
                .map_or(defaults.max_backoff, Duration::from_millis),
        }
    }
}
