//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, RecordId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    Error::invalid_request(format!("{} is required", field.as_str())).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Reject blank strings for required body fields.
pub(crate) fn require_text(value: &str, field: FieldName) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(missing_field_error(field))
    } else {
        Ok(())
    }
}

/// Parse an opaque record identifier taken from the request path.
pub(crate) fn parse_record_id(raw: &str, field: FieldName) -> Result<RecordId, Error> {
    Uuid::parse_str(raw.trim())
        .map(RecordId::from_uuid)
        .map_err(|_| {
            Error::invalid_request(format!("{} must be a valid UUID", field.as_str()))
                .with_details(json!({
                    "field": field.as_str(),
                    "value": raw,
                    "code": ErrorCode::InvalidUuid.as_str(),
                }))
        })
}
