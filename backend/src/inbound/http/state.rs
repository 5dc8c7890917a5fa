//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, RecordsCommand, RecordsQuery, SubdomainClaims};

/// Where browsers land after a completed login when nothing else is set.
pub const DEFAULT_LANDING_URL: &str = "/";

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub claims: Arc<dyn SubdomainClaims>,
    pub records: Arc<dyn RecordsCommand>,
    pub records_query: Arc<dyn RecordsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub claims: Arc<dyn SubdomainClaims>,
    pub records: Arc<dyn RecordsCommand>,
    pub records_query: Arc<dyn RecordsQuery>,
    pub landing_url: String,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, DEFAULT_LANDING_URL)
    }
}

impl HttpState {
    /// Construct state from the ports bundle and the post-login landing URL.
    pub fn new(ports: HttpStatePorts, landing_url: impl Into<String>) -> Self {
        let HttpStatePorts {
            login,
            claims,
            records,
            records_query,
        } = ports;
        Self {
            login,
            claims,
            records,
            records_query,
            landing_url: landing_url.into(),
        }
    }
}
