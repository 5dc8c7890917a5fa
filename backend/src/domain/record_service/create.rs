//! Create protocol, including create-as-update for an existing name/type.

use crate::domain::ports::{
    ClaimRepository, CreateRecordRequest, DnsGateway, RecordChange, RecordRepository,
    RecordRepositoryError,
};
use crate::domain::{DnsRecord, RecordContent, RegistryError, UserId};

use super::RecordService;

impl<R, C, G> RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    pub(super) async fn create_record(
        &self,
        request: CreateRecordRequest,
    ) -> Result<RecordChange, RegistryError> {
        let content = self.resolve_create(&request).await?;
        let user_id = request.user_id;

        if let Some(existing) = self
            .records
            .find_by_name_and_type(&content.name, content.record_type)
            .await?
        {
            return self
                .update_existing(&user_id, existing, content, request.active)
                .await;
        }

        let remote_id = if request.active {
            Some(self.publish(&content).await?)
        } else {
            None
        };
        let record = DnsRecord::new(user_id.clone(), content.clone(), remote_id.clone());

        match self.records.insert(&record).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %user_id,
                    record_id = %record.id,
                    name = %record.content.name,
                    record_type = %record.content.record_type,
                    active = record.is_active(),
                    "record created"
                );
                Ok(RecordChange {
                    record,
                    created: true,
                })
            }
            Err(err) => {
                if let Some(remote_id) = &remote_id {
                    self.compensate(remote_id).await;
                }
                match err {
                    RecordRepositoryError::Duplicate { .. } => {
                        self.retry_as_update(&user_id, content, request.active)
                            .await
                    }
                    other => Err(other.into()),
                }
            }
        }
    }

    /// A concurrent create won the unique (name, type) race; update the row
    /// it inserted instead.
    async fn retry_as_update(
        &self,
        user_id: &UserId,
        content: RecordContent,
        active: bool,
    ) -> Result<RecordChange, RegistryError> {
        let existing = self
            .records
            .find_by_name_and_type(&content.name, content.record_type)
            .await?
            .ok_or_else(|| RegistryError::DuplicateRecord {
                name: content.name.to_string(),
                record_type: content.record_type.to_string(),
            })?;
        self.update_existing(user_id, existing, content, active)
            .await
    }

    async fn update_existing(
        &self,
        user_id: &UserId,
        existing: DnsRecord,
        content: RecordContent,
        active: bool,
    ) -> Result<RecordChange, RegistryError> {
        if !existing.is_owned_by(user_id) {
            let label = content
                .name
                .owning_label(&self.config.parent_domain)
                .map(|label| label.to_string())
                .unwrap_or_else(|_| content.name.to_string());
            return Err(RegistryError::SubdomainForbidden { label });
        }
        let record = self.reconcile(user_id, existing, content, active).await?;
        Ok(RecordChange {
            record,
            created: false,
        })
    }
}
