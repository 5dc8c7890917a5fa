//! Port abstraction for the durable record store.
use async_trait::async_trait;

use crate::domain::{DnsRecord, RecordId, RecordName, RecordType, RemoteRecordId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by record repository adapters.
    pub enum RecordRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "record repository query failed: {message}",
        /// The (name, type) pair is already stored by another row.
        Duplicate { name: String, record_type: String } =>
            "a {record_type} record named {name} already exists",
        /// The row to update no longer exists.
        Missing { id: String } => "record {id} no longer exists",
        /// The row's remote id changed since it was read.
        Stale { id: String } => "record {id} was changed by another request",
    }
}

/// Durable table of record intents.
///
/// Implementations enforce `(name, type)` uniqueness in storage and must
/// persist the remote id and the active flag together.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Fetch a record by id.
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<DnsRecord>, RecordRepositoryError>;

    /// Fetch the record stored for a (name, type) pair.
    async fn find_by_name_and_type(
        &self,
        name: &RecordName,
        record_type: RecordType,
    ) -> Result<Option<DnsRecord>, RecordRepositoryError>;

    /// List a user's records, oldest first.
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<DnsRecord>, RecordRepositoryError>;

    /// Whether any record of any type uses `name`.
    async fn name_exists(&self, name: &RecordName) -> Result<bool, RecordRepositoryError>;

    /// Insert a new record.
    async fn insert(&self, record: &DnsRecord) -> Result<(), RecordRepositoryError>;

    /// Overwrite content and publication state of an existing record,
    /// provided its stored remote id still equals `expected_remote_id`.
    ///
    /// Fails with [`RecordRepositoryError::Stale`] when another writer moved
    /// the remote id in between, and with [`RecordRepositoryError::Missing`]
    /// when the row is gone.
    async fn update(
        &self,
        record: &DnsRecord,
        expected_remote_id: Option<RemoteRecordId>,
    ) -> Result<(), RecordRepositoryError>;

    /// Delete a record, returning whether a row was removed.
    async fn delete(&self, id: &RecordId) -> Result<bool, RecordRepositoryError>;
}
