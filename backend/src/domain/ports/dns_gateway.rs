//! Driven port for the authoritative DNS provider.
//!
//! Gateways perform exactly one network call per method and never retry;
//! retry decisions belong to the record service, which consults
//! [`DnsGatewayError::is_transient`].
use async_trait::async_trait;

use crate::domain::{RecordContent, RemoteRecordId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by DNS gateway adapters.
    pub enum DnsGatewayError {
        /// Zone id or credential missing. Never retryable.
        Configuration { message: String } => "DNS provider configuration error: {message}",
        /// Provider answered with a failure envelope or non-2xx status.
        Provider { message: String, status: Option<u16> } => "{message}",
        /// Connection could not be established or was interrupted.
        Transport { message: String } => "DNS provider unreachable: {message}",
        /// Provider did not answer in time.
        Timeout { message: String } => "DNS provider timed out: {message}",
        /// Provider has no record with this id.
        RemoteRecordMissing { remote_id: String } => "remote record {remote_id} does not exist",
    }
}

impl DnsGatewayError {
    /// Whether repeating the call might succeed.
    ///
    /// # Examples
    /// ```
    /// use subdomain_registry::domain::ports::DnsGatewayError;
    ///
    /// assert!(DnsGatewayError::timeout("10s elapsed").is_transient());
    /// assert!(DnsGatewayError::provider("busy", 503_u16).is_transient());
    /// assert!(!DnsGatewayError::provider("bad name", 400_u16).is_transient());
    /// assert!(!DnsGatewayError::configuration("zone id missing").is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Provider { status, .. } => {
                matches!(status, Some(code) if *code == 429 || *code >= 500)
            }
            Self::Configuration { .. } | Self::RemoteRecordMissing { .. } => false,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsGateway: Send + Sync {
    /// Publish a record, returning the provider-assigned id.
    async fn create(&self, content: &RecordContent) -> Result<RemoteRecordId, DnsGatewayError>;

    /// Replace the published content of an existing record.
    async fn update(
        &self,
        remote_id: &RemoteRecordId,
        content: &RecordContent,
    ) -> Result<(), DnsGatewayError>;

    /// Remove a published record.
    async fn delete(&self, remote_id: &RemoteRecordId) -> Result<(), DnsGatewayError>;
}
