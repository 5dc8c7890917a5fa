//! Registry entry-point: loads settings, prepares storage and starts the
//! HTTP server.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::session::{BuildMode, session_settings};
use server::settings::AppSettings;
use server::{ServerConfig, ServiceSettings, create_server};
use subdomain_registry::inbound::http::health::HealthState;
use subdomain_registry::outbound::persistence::{DbPool, run_pending_migrations};

fn config_error(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, error.to_string())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(config_error)?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .map_err(config_error)?;
    let services = ServiceSettings {
        registry: settings.registry_config().map_err(config_error)?,
        cloudflare: settings.cloudflare_config().map_err(config_error)?,
        github: settings.github_config(),
        retry: settings.retry_config(),
        landing_url: settings.landing_url().to_owned(),
    };
    let bind_addr = settings.bind_addr().map_err(config_error)?;
    info!(
        parent_domain = %services.registry.parent_domain,
        %bind_addr,
        "starting subdomain registry"
    );

    let mut config = ServerConfig::new(session, services, bind_addr);
    if let Some(pool_config) = settings.pool_config() {
        run_pending_migrations(pool_config.database_url())
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(pool_config)
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
