//! Record table held in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::ports::{RecordRepository, RecordRepositoryError};
use crate::domain::{DnsRecord, RecordId, RecordName, RecordType, RemoteRecordId, UserId};

/// Records keyed by id with a unique `(name, type)` pair.
#[derive(Debug, Default)]
pub struct MemoryRecordRepository {
    records: Mutex<HashMap<RecordId, DnsRecord>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn collides(stored: &DnsRecord, candidate: &DnsRecord) -> bool {
    stored.id != candidate.id
        && stored.content.name == candidate.content.name
        && stored.content.record_type == candidate.content.record_type
}

fn duplicate(record: &DnsRecord) -> RecordRepositoryError {
    RecordRepositoryError::duplicate(
        record.content.name.as_ref(),
        record.content.record_type.as_str(),
    )
}

#[async_trait]
impl RecordRepository for MemoryRecordRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<DnsRecord>, RecordRepositoryError> {
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn find_by_name_and_type(
        &self,
        name: &RecordName,
        record_type: RecordType,
    ) -> Result<Option<DnsRecord>, RecordRepositoryError> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .find(|r| &r.content.name == name && r.content.record_type == record_type)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<DnsRecord>, RecordRepositoryError> {
        let records = self.records.lock().await;
        let mut owned: Vec<DnsRecord> = records
            .values()
            .filter(|r| r.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by_key(|r| (r.created_at, *r.id.as_uuid()));
        Ok(owned)
    }

    async fn name_exists(&self, name: &RecordName) -> Result<bool, RecordRepositoryError> {
        let records = self.records.lock().await;
        Ok(records.values().any(|r| &r.content.name == name))
    }

    async fn insert(&self, record: &DnsRecord) -> Result<(), RecordRepositoryError> {
        let mut records = self.records.lock().await;
        if records.values().any(|stored| collides(stored, record)) {
            return Err(duplicate(record));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(
        &self,
        record: &DnsRecord,
        expected_remote_id: Option<RemoteRecordId>,
    ) -> Result<(), RecordRepositoryError> {
        let mut records = self.records.lock().await;
        let Some(current) = records.get(&record.id) else {
            return Err(RecordRepositoryError::missing(record.id.to_string()));
        };
        if current.remote_id != expected_remote_id {
            return Err(RecordRepositoryError::stale(record.id.to_string()));
        }
        if records.values().any(|stored| collides(stored, record)) {
            return Err(duplicate(record));
        }
        let mut updated = record.clone();
        updated.updated_at = Utc::now();
        records.insert(record.id, updated);
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, RecordRepositoryError> {
        Ok(self.records.lock().await.remove(id).is_some())
    }
}
