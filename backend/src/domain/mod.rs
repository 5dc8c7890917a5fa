//! Domain primitives, ports and services.
//!
//! Purpose: Define strongly typed registry entities (claims, record names,
//! record content) and the services that keep the record store consistent
//! with the DNS provider. Inbound and outbound adapters depend on this
//! module; it depends on neither.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - RegistryError: named claim and record failures.
//! - SubdomainClaimService, RecordService, GitHubLoginService: driving port
//!   implementations.

pub mod claim_service;
pub mod error;
pub mod login_service;
pub mod ports;
pub mod record;
pub mod record_service;
pub mod registry_error;
pub mod retry;
pub mod subdomain;
pub mod trace_id;
pub mod user;
pub mod zone;

pub use self::claim_service::SubdomainClaimService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::login_service::GitHubLoginService;
pub use self::record::{
    DnsRecord, RecordContent, RecordId, RecordType, RecordTypeError, RecordValue, RemoteRecordId,
    Ttl, TtlError, VALUE_MAX, ValueError,
};
pub use self::record_service::RecordService;
pub use self::registry_error::RegistryError;
pub use self::retry::{BackoffJitter, RetryConfig, RetryPolicy, RetrySleeper, TokioSleeper};
pub use self::subdomain::{ClaimId, LABEL_MAX, LabelError, SubdomainClaim, SubdomainLabel};
pub use self::trace_id::TraceId;
pub use self::user::{GitHubAccount, User, UserId, UserValidationError};
pub use self::zone::{
    NAME_MAX, NameError, ParentDomain, PlacementError, RecordName, RegistryConfig,
    check_placement,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use subdomain_registry::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
