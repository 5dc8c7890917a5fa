//! Named failures of the claim ledger and the record services.
//!
//! Each variant carries a stable snake_case code that adapters expose as
//! `details.code`, alongside the coarse [`ErrorCode`] class.

use serde_json::json;

use super::ports::{ClaimRepositoryError, RecordRepositoryError};
use super::{
    Error, ErrorCode, LabelError, NameError, PlacementError, RecordTypeError, TtlError,
    ValueError,
};

/// Failures raised while claiming subdomains or reconciling records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidLabel(LabelError),
    #[error(transparent)]
    InvalidName(NameError),
    #[error(transparent)]
    InvalidRecordType(RecordTypeError),
    #[error(transparent)]
    InvalidValue(ValueError),
    #[error(transparent)]
    InvalidTtl(TtlError),
    #[error(transparent)]
    InvalidPlacement(PlacementError),
    #[error("user already has a subdomain claim; only one subdomain per user is allowed")]
    AlreadyClaimed,
    #[error("subdomain {label} is already claimed")]
    LabelTaken { label: String },
    #[error("no subdomain claim found")]
    NoClaim,
    #[error("subdomain {label} is not claimed; claim it first")]
    SubdomainNotClaimed { label: String },
    #[error("subdomain {label} is claimed by another user")]
    SubdomainForbidden { label: String },
    #[error("record not found")]
    RecordNotFound,
    #[error("a {record_type} record named {name} already exists")]
    DuplicateRecord { name: String, record_type: String },
    #[error("record was changed by another request; reload it and retry")]
    RecordChanged,
    #[error("{message}")]
    RemotePublishFailed { message: String },
    #[error("{message}")]
    RemoteUpdateFailed { message: String },
    #[error("{message}")]
    RemoteDeprovisionFailed { message: String },
    #[error("DNS provider is misconfigured: {message}")]
    RemoteConfiguration { message: String },
    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },
    #[error("storage failure: {message}")]
    Persistence { message: String },
}

impl RegistryError {
    /// Stable machine-readable failure name.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLabel(_) => "invalid_label",
            Self::InvalidName(_) => "invalid_name",
            Self::InvalidRecordType(_) => "unsupported_record_type",
            Self::InvalidValue(_) => "invalid_value",
            Self::InvalidTtl(_) => "invalid_ttl",
            Self::InvalidPlacement(PlacementError::ForbiddenType { .. }) => "forbidden_record_type",
            Self::InvalidPlacement(_) => "invalid_placement",
            Self::AlreadyClaimed => "already_claimed",
            Self::LabelTaken { .. } => "label_taken",
            Self::NoClaim => "no_claim",
            Self::SubdomainNotClaimed { .. } => "subdomain_not_claimed",
            Self::SubdomainForbidden { .. } => "subdomain_forbidden",
            Self::RecordNotFound => "record_not_found",
            Self::DuplicateRecord { .. } => "duplicate_record",
            Self::RecordChanged => "record_changed",
            Self::RemotePublishFailed { .. } => "remote_publish_failed",
            Self::RemoteUpdateFailed { .. } => "remote_update_failed",
            Self::RemoteDeprovisionFailed { .. } => "remote_deprovision_failed",
            Self::RemoteConfiguration { .. } => "remote_configuration_error",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::Persistence { .. } => "persistence_error",
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidLabel(_)
            | Self::InvalidName(_)
            | Self::InvalidRecordType(_)
            | Self::InvalidValue(_)
            | Self::InvalidTtl(_)
            | Self::InvalidPlacement(_) => ErrorCode::InvalidRequest,
            Self::SubdomainNotClaimed { .. } | Self::SubdomainForbidden { .. } => {
                ErrorCode::Forbidden
            }
            Self::AlreadyClaimed
            | Self::LabelTaken { .. }
            | Self::DuplicateRecord { .. }
            | Self::RecordChanged => ErrorCode::Conflict,
            Self::NoClaim | Self::RecordNotFound => ErrorCode::NotFound,
            Self::RemotePublishFailed { .. }
            | Self::RemoteUpdateFailed { .. }
            | Self::RemoteDeprovisionFailed { .. } => ErrorCode::BadGateway,
            Self::StorageUnavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::RemoteConfiguration { .. } | Self::Persistence { .. } => {
                ErrorCode::InternalError
            }
        }
    }
}

impl From<LabelError> for RegistryError {
    fn from(value: LabelError) -> Self {
        Self::InvalidLabel(value)
    }
}

impl From<NameError> for RegistryError {
    fn from(value: NameError) -> Self {
        match value {
            NameError::Apex => Self::InvalidPlacement(PlacementError::ParentApex),
            other => Self::InvalidName(other),
        }
    }
}

impl From<RecordTypeError> for RegistryError {
    fn from(value: RecordTypeError) -> Self {
        match value {
            RecordTypeError::Forbidden { record_type } => {
                Self::InvalidPlacement(PlacementError::ForbiddenType { record_type })
            }
            other => Self::InvalidRecordType(other),
        }
    }
}

impl From<ValueError> for RegistryError {
    fn from(value: ValueError) -> Self {
        Self::InvalidValue(value)
    }
}

impl From<TtlError> for RegistryError {
    fn from(value: TtlError) -> Self {
        Self::InvalidTtl(value)
    }
}

impl From<PlacementError> for RegistryError {
    fn from(value: PlacementError) -> Self {
        Self::InvalidPlacement(value)
    }
}

impl From<ClaimRepositoryError> for RegistryError {
    fn from(value: ClaimRepositoryError) -> Self {
        match value {
            ClaimRepositoryError::Connection { message } => Self::StorageUnavailable { message },
            ClaimRepositoryError::Query { message } => Self::Persistence { message },
            ClaimRepositoryError::UserAlreadyClaimed => Self::AlreadyClaimed,
            ClaimRepositoryError::LabelTaken { label } => Self::LabelTaken { label },
        }
    }
}

impl From<RecordRepositoryError> for RegistryError {
    fn from(value: RecordRepositoryError) -> Self {
        match value {
            RecordRepositoryError::Connection { message } => Self::StorageUnavailable { message },
            RecordRepositoryError::Query { message } => Self::Persistence { message },
            RecordRepositoryError::Duplicate { name, record_type } => {
                Self::DuplicateRecord { name, record_type }
            }
            RecordRepositoryError::Missing { .. } => Self::RecordNotFound,
            RecordRepositoryError::Stale { .. } => Self::RecordChanged,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(value: RegistryError) -> Self {
        Error::new(value.error_code(), value.to_string()).with_details(json!({
            "code": value.code(),
        }))
    }
}
