//! Builders wiring repositories, gateways and services into HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use subdomain_registry::domain::ports::{
    ClaimRepository, DnsGateway, IdentityProvider, RecordRepository, UserRepository,
};
use subdomain_registry::domain::{
    GitHubLoginService, RecordService, RetryPolicy, SubdomainClaimService,
};
use subdomain_registry::inbound::http::state::{HttpState, HttpStatePorts};
use subdomain_registry::outbound::cloudflare::CloudflareHttpGateway;
use subdomain_registry::outbound::github::GitHubOAuthClient;
use subdomain_registry::outbound::memory::{
    MemoryClaimRepository, MemoryRecordRepository, MemoryUserRepository,
};
use subdomain_registry::outbound::persistence::{
    DieselClaimRepository, DieselRecordRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repositories backing the services, either Diesel or in-memory.
struct Stores<C, R, U> {
    claims: Arc<C>,
    records: Arc<R>,
    users: Arc<U>,
}

fn build_ports<C, R, U, G, P>(
    stores: Stores<C, R, U>,
    gateway: Arc<G>,
    provider: Arc<P>,
    config: &ServerConfig,
) -> HttpStatePorts
where
    C: ClaimRepository + 'static,
    R: RecordRepository + 'static,
    U: UserRepository + 'static,
    G: DnsGateway + 'static,
    P: IdentityProvider + 'static,
{
    let Stores {
        claims,
        records,
        users,
    } = stores;
    let record_service = Arc::new(RecordService::new(
        records,
        claims.clone(),
        gateway,
        config.registry.clone(),
        RetryPolicy::new(config.retry),
    ));
    HttpStatePorts {
        login: Arc::new(GitHubLoginService::new(users, provider)),
        claims: Arc::new(SubdomainClaimService::new(claims, config.registry.clone())),
        records: record_service.clone(),
        records_query: record_service,
    }
}

/// Build the shared HTTP state.
///
/// Uses the Diesel repositories when a pool is configured, otherwise the
/// in-memory ones.
///
/// # Errors
/// Returns [`std::io::Error`] when an HTTP client cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let gateway = Arc::new(
        CloudflareHttpGateway::new(config.cloudflare.clone())
            .map_err(|e| std::io::Error::other(format!("Cloudflare client: {e}")))?,
    );
    let provider = Arc::new(
        GitHubOAuthClient::new(config.github.clone())
            .map_err(|e| std::io::Error::other(format!("GitHub client: {e}")))?,
    );

    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Stores {
                claims: Arc::new(DieselClaimRepository::new(pool.clone())),
                records: Arc::new(DieselRecordRepository::new(pool.clone())),
                users: Arc::new(DieselUserRepository::new(pool.clone())),
            },
            gateway,
            provider,
            config,
        ),
        None => {
            warn!("no database configured; claims and records are kept in memory");
            build_ports(
                Stores {
                    claims: Arc::new(MemoryClaimRepository::new()),
                    records: Arc::new(MemoryRecordRepository::new()),
                    users: Arc::new(MemoryUserRepository::new()),
                },
                gateway,
                provider,
                config,
            )
        }
    };
    Ok(web::Data::new(HttpState::new(
        ports,
        config.landing_url.clone(),
    )))
}
