//! Record reconciliation service.
//!
//! Keeps the record store and the DNS provider consistent across create,
//! update, activation toggles and delete. Ordering rules:
//!
//! - publish remotely before committing locally (create, activate);
//! - deprovision remotely before clearing or deleting locally (deactivate,
//!   delete);
//! - when a local write fails after a remote create, delete the remote
//!   record again so no published record is left without a local owner.
//!
//! A stored record therefore carries a remote id exactly when it is live.

mod create;
mod remote;
mod update;
mod validation;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    ClaimRepository, CreateRecordRequest, DnsGateway, RecordChange, RecordRepository,
    RecordsCommand, RecordsQuery, UpdateRecordRequest,
};
use crate::domain::{
    DnsRecord, RecordId, RecordName, RegistryConfig, RegistryError, RetryPolicy, UserId,
};

/// Reconciliation engine implementing the record driving ports.
#[derive(Clone)]
pub struct RecordService<R, C, G> {
    records: Arc<R>,
    claims: Arc<C>,
    gateway: Arc<G>,
    config: RegistryConfig,
    retry: RetryPolicy,
}

impl<R, C, G> RecordService<R, C, G> {
    /// Create a service over the record store, claim ledger and gateway.
    pub fn new(
        records: Arc<R>,
        claims: Arc<C>,
        gateway: Arc<G>,
        config: RegistryConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            records,
            claims,
            gateway,
            config,
            retry,
        }
    }
}

impl<R, C, G> RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    async fn owned_record(
        &self,
        user_id: &UserId,
        record_id: &RecordId,
    ) -> Result<DnsRecord, RegistryError> {
        self.records
            .find_by_id(record_id)
            .await?
            .filter(|record| record.is_owned_by(user_id))
            .ok_or(RegistryError::RecordNotFound)
    }
}

#[async_trait]
impl<R, C, G> RecordsCommand for RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    async fn create(&self, request: CreateRecordRequest) -> Result<RecordChange, RegistryError> {
        self.create_record(request).await
    }

    async fn update(&self, request: UpdateRecordRequest) -> Result<DnsRecord, RegistryError> {
        let existing = self
            .owned_record(&request.user_id, &request.record_id)
            .await?;
        let desired = self.merge_content(&request, &existing).await?;
        let active = request.active.unwrap_or_else(|| existing.is_active());
        self.reconcile(&request.user_id, existing, desired, active)
            .await
    }

    async fn delete(
        &self,
        user_id: &UserId,
        record_id: &RecordId,
    ) -> Result<DnsRecord, RegistryError> {
        let record = self.owned_record(user_id, record_id).await?;
        if let Some(remote_id) = &record.remote_id {
            self.deprovision(remote_id).await.map_err(|err| {
                remote::deprovision_failure(&record, err)
            })?;
        }
        if let Err(err) = self.records.delete(&record.id).await {
            if let Some(remote_id) = &record.remote_id {
                // Retrying the delete is safe: a missing remote record counts
                // as deprovisioned.
                tracing::error!(
                    record_id = %record.id,
                    remote_id = %remote_id,
                    error = %err,
                    "remote record removed but local row could not be deleted"
                );
            }
            return Err(err.into());
        }
        tracing::info!(record_id = %record.id, name = %record.content.name, "record deleted");
        Ok(record)
    }
}

#[async_trait]
impl<R, C, G> RecordsQuery for RecordService<R, C, G>
where
    R: RecordRepository,
    C: ClaimRepository,
    G: DnsGateway,
{
    async fn list(&self, user_id: &UserId) -> Result<Vec<DnsRecord>, RegistryError> {
        Ok(self.records.list_for_user(user_id).await?)
    }

    async fn get(
        &self,
        user_id: &UserId,
        record_id: &RecordId,
    ) -> Result<DnsRecord, RegistryError> {
        self.owned_record(user_id, record_id).await
    }

    async fn check_availability(&self, name: &str) -> Result<bool, RegistryError> {
        let name = RecordName::qualify(name, &self.config.parent_domain)?;
        Ok(!self.records.name_exists(&name).await?)
    }
}
