//! Gateway calls, deprovision retries and compensation.

use tracing::{error, info, warn};

use crate::domain::ports::{ClaimRepository, DnsGateway, DnsGatewayError, RecordRepository};
use crate::domain::{DnsRecord, RecordContent, RegistryError, RemoteRecordId};

use super::RecordService;

impl<R, C, G> RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    /// Publish content, returning the provider id. Never retried.
    pub(super) async fn publish(
        &self,
        content: &RecordContent,
    ) -> Result<RemoteRecordId, RegistryError> {
        match self.gateway.create(content).await {
            Ok(remote_id) => {
                info!(name = %content.name, record_type = %content.record_type, remote_id = %remote_id, "record published");
                Ok(remote_id)
            }
            Err(err) => {
                warn!(name = %content.name, record_type = %content.record_type, error = %err, "publishing record failed");
                Err(remote_failure(err, |message| {
                    RegistryError::RemotePublishFailed { message }
                }))
            }
        }
    }

    /// Push changed content to an already published record.
    pub(super) async fn push_update(
        &self,
        remote_id: &RemoteRecordId,
        content: &RecordContent,
    ) -> Result<(), RegistryError> {
        self.gateway
            .update(remote_id, content)
            .await
            .map_err(|err| {
                warn!(remote_id = %remote_id, error = %err, "updating remote record failed");
                remote_failure(err, |message| RegistryError::RemoteUpdateFailed { message })
            })
    }

    /// Delete a published record, retrying transient failures. A record the
    /// provider no longer knows counts as removed.
    pub(super) async fn deprovision(
        &self,
        remote_id: &RemoteRecordId,
    ) -> Result<(), DnsGatewayError> {
        let mut attempt = 1;
        loop {
            match self.gateway.delete(remote_id).await {
                Ok(()) => {
                    info!(remote_id = %remote_id, attempt, "remote record deprovisioned");
                    return Ok(());
                }
                Err(DnsGatewayError::RemoteRecordMissing { .. }) => {
                    info!(remote_id = %remote_id, "remote record already absent");
                    return Ok(());
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts() => {
                    warn!(remote_id = %remote_id, attempt, error = %err, "deprovisioning failed; retrying");
                    self.retry.pause(attempt).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(remote_id = %remote_id, attempt, error = %err, "deprovisioning failed");
                    return Err(err);
                }
            }
        }
    }

    /// Best-effort removal of a record published for a local write that did
    /// not happen.
    pub(super) async fn compensate(&self, remote_id: &RemoteRecordId) {
        if let Err(err) = self.deprovision(remote_id).await {
            error!(
                remote_id = %remote_id,
                error = %err,
                "orphaned remote record: compensation after failed local write did not succeed"
            );
        }
    }
}

/// Map a delete failure for `record` into the registry taxonomy.
pub(super) fn deprovision_failure(record: &DnsRecord, err: DnsGatewayError) -> RegistryError {
    warn!(record_id = %record.id, error = %err, "record left published");
    remote_failure(err, |message| RegistryError::RemoteDeprovisionFailed {
        message,
    })
}

fn remote_failure(
    err: DnsGatewayError,
    wrap: impl FnOnce(String) -> RegistryError,
) -> RegistryError {
    match err {
        DnsGatewayError::Configuration { message } => {
            RegistryError::RemoteConfiguration { message }
        }
        other => wrap(other.to_string()),
    }
}
