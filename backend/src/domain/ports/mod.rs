//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod claim_repository;
mod dns_gateway;
mod identity_provider;
mod login_service;
mod record_repository;
mod records_command;
mod records_query;
mod subdomain_claims;
mod user_repository;

#[cfg(test)]
pub use claim_repository::MockClaimRepository;
pub use claim_repository::{ClaimRepository, ClaimRepositoryError};
#[cfg(test)]
pub use dns_gateway::MockDnsGateway;
pub use dns_gateway::{DnsGateway, DnsGatewayError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use record_repository::MockRecordRepository;
pub use record_repository::{RecordRepository, RecordRepositoryError};
#[cfg(test)]
pub use records_command::MockRecordsCommand;
pub use records_command::{CreateRecordRequest, RecordChange, RecordsCommand, UpdateRecordRequest};
#[cfg(test)]
pub use records_query::MockRecordsQuery;
pub use records_query::RecordsQuery;
#[cfg(test)]
pub use subdomain_claims::MockSubdomainClaims;
pub use subdomain_claims::{ClaimedSubdomain, SubdomainClaims};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
