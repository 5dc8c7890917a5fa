//! Driving port for record reads.

use async_trait::async_trait;

use crate::domain::{DnsRecord, RecordId, RegistryError, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordsQuery: Send + Sync {
    /// Records owned by the caller, oldest first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<DnsRecord>, RegistryError>;

    /// One record owned by the caller. Other users' records are reported as
    /// [`RegistryError::RecordNotFound`].
    async fn get(&self, user_id: &UserId, record_id: &RecordId)
    -> Result<DnsRecord, RegistryError>;

    /// Whether no stored record of any type uses `name`.
    async fn check_availability(&self, name: &str) -> Result<bool, RegistryError>;
}
