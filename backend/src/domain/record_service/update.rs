//! Update-in-place and activation toggles.

use chrono::Utc;
use tracing::error;

use crate::domain::ports::{ClaimRepository, DnsGateway, RecordRepository, RecordRepositoryError};
use crate::domain::{DnsRecord, RecordContent, RegistryError, UserId};

use super::RecordService;
use super::remote::deprovision_failure;

impl<R, C, G> RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    /// Move `existing` to `desired` content and publication state.
    ///
    /// | stored   | requested | remote call          | on remote failure         |
    /// |----------|-----------|----------------------|---------------------------|
    /// | inactive | inactive  | none                 | n/a                       |
    /// | inactive | active    | create               | `RemotePublishFailed`     |
    /// | active   | active    | update, if changed   | `RemoteUpdateFailed`      |
    /// | active   | inactive  | delete, with retries | `RemoteDeprovisionFailed` |
    ///
    /// A remote failure leaves the stored row untouched. The local write only
    /// lands if the row still carries the remote id read here; otherwise the
    /// request fails with `RecordChanged` after undoing its own remote call.
    pub(super) async fn reconcile(
        &self,
        user_id: &UserId,
        existing: DnsRecord,
        desired: RecordContent,
        active: bool,
    ) -> Result<DnsRecord, RegistryError> {
        self.ensure_unique(&existing, &desired).await?;

        let mut next = existing.clone();
        next.content = desired;
        next.updated_at = Utc::now();
        let expected = existing.remote_id.clone();

        match (existing.remote_id.as_ref(), active) {
            (None, false) => {
                self.records.update(&next, expected).await?;
            }
            (None, true) => {
                let remote_id = self.publish(&next.content).await?;
                next.remote_id = Some(remote_id.clone());
                if let Err(err) = self.records.update(&next, expected).await {
                    self.compensate(&remote_id).await;
                    return Err(err.into());
                }
            }
            (Some(remote_id), true) => {
                let changed = next.content != existing.content;
                if changed {
                    self.push_update(remote_id, &next.content).await?;
                }
                match self.records.update(&next, expected).await {
                    Ok(()) => {}
                    // Another request already unlinked `remote_id`.
                    Err(err @ RecordRepositoryError::Stale { .. }) => return Err(err.into()),
                    Err(err) => {
                        if changed {
                            self.restore_remote(&existing).await;
                        }
                        return Err(err.into());
                    }
                }
            }
            (Some(remote_id), false) => {
                self.deprovision(remote_id)
                    .await
                    .map_err(|err| deprovision_failure(&existing, err))?;
                next.remote_id = None;
                match self.records.update(&next, expected).await {
                    Ok(()) => {}
                    // The row already points elsewhere, so nothing links the
                    // removed remote record any more.
                    Err(err @ RecordRepositoryError::Stale { .. }) => return Err(err.into()),
                    Err(err) => {
                        // The stale remote id is harmless: deactivating again
                        // treats the missing remote record as removed.
                        error!(
                            record_id = %existing.id,
                            remote_id = %remote_id,
                            error = %err,
                            "remote record removed but local row still marks it published"
                        );
                        return Err(err.into());
                    }
                }
            }
        }

        tracing::info!(
            user_id = %user_id,
            record_id = %next.id,
            active = next.is_active(),
            "record updated"
        );
        Ok(next)
    }

    async fn ensure_unique(
        &self,
        existing: &DnsRecord,
        desired: &RecordContent,
    ) -> Result<(), RegistryError> {
        let current = &existing.content;
        if desired.name == current.name && desired.record_type == current.record_type {
            return Ok(());
        }
        match self
            .records
            .find_by_name_and_type(&desired.name, desired.record_type)
            .await?
        {
            Some(other) if other.id != existing.id => Err(RegistryError::DuplicateRecord {
                name: desired.name.to_string(),
                record_type: desired.record_type.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn restore_remote(&self, existing: &DnsRecord) {
        let Some(remote_id) = existing.remote_id.as_ref() else {
            return;
        };
        if let Err(err) = self.gateway.update(remote_id, &existing.content).await {
            error!(
                record_id = %existing.id,
                remote_id = %remote_id,
                error = %err,
                "remote record content diverges from the stored row"
            );
        }
    }
}
