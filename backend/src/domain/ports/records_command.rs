//! Driving port for record mutations.
//!
//! Every mutation keeps the record store and the DNS provider consistent:
//! a stored record carries a remote id exactly when it is published.

use async_trait::async_trait;

use crate::domain::{DnsRecord, RecordId, RegistryError, UserId};

/// Request to create a record, or to update the existing row for the same
/// name and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordRequest {
    pub user_id: UserId,
    /// Relative (`alice`) or fully-qualified (`alice.example.com`) name.
    pub name: String,
    pub record_type: String,
    pub value: String,
    /// `None` or `0` selects the provider's automatic TTL.
    pub ttl: Option<u32>,
    pub active: bool,
}

/// Partial update of an existing record. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecordRequest {
    pub user_id: UserId,
    pub record_id: RecordId,
    pub name: Option<String>,
    pub record_type: Option<String>,
    pub value: Option<String>,
    pub ttl: Option<u32>,
    pub active: Option<bool>,
}

/// Outcome of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub record: DnsRecord,
    /// `false` when an existing row was updated in place.
    pub created: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordsCommand: Send + Sync {
    /// Create a record, publishing it first when `active` is requested.
    async fn create(&self, request: CreateRecordRequest) -> Result<RecordChange, RegistryError>;

    /// Apply a partial update, toggling publication as requested.
    async fn update(&self, request: UpdateRecordRequest) -> Result<DnsRecord, RegistryError>;

    /// Deprovision and delete a record, returning the removed row.
    async fn delete(&self, user_id: &UserId, record_id: &RecordId)
    -> Result<DnsRecord, RegistryError>;
}
