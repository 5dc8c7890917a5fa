//! PostgreSQL-backed `RecordRepository` implementation using Diesel ORM.
//!
//! `is_active` is written from the presence of the remote id and ignored on
//! read; the `records_publication_check` constraint keeps both columns in
//! step. Updates are conditional on the remote id the caller last read.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RecordRepository, RecordRepositoryError};
use crate::domain::{
    DnsRecord, RecordContent, RecordId, RecordName, RecordType, RecordValue, RemoteRecordId, Ttl,
    UserId,
};

use super::diesel_helpers::{
    map_basic_diesel_error, map_basic_pool_error, non_negative, saturating_i32, unique_violation,
};
use super::models::{RecordRow, RecordUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::records;

const NAME_TYPE_CONSTRAINT: &str = "records_name_type_key";

/// Diesel-backed implementation of the `RecordRepository` port.
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
}

impl DieselRecordRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecordRepositoryError {
    map_basic_pool_error(error, RecordRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecordRepositoryError {
    map_basic_diesel_error(
        error,
        RecordRepositoryError::query,
        RecordRepositoryError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, record: &DnsRecord) -> RecordRepositoryError {
    let constraint = unique_violation(&error).map(str::to_owned);
    match constraint.as_deref() {
        Some(NAME_TYPE_CONSTRAINT) => RecordRepositoryError::duplicate(
            record.content.name.as_ref(),
            record.content.record_type.as_str(),
        ),
        Some(other) => {
            warn!(constraint = other, "unrecognised unique violation on records");
            RecordRepositoryError::query("unique constraint violated")
        }
        None => map_diesel_error(error),
    }
}

fn row_to_record(row: RecordRow) -> Result<DnsRecord, RecordRepositoryError> {
    let record_type = row.record_type.parse::<RecordType>().map_err(|err| {
        RecordRepositoryError::query(format!("stored record {} is unreadable: {err}", row.id))
    })?;
    Ok(DnsRecord {
        id: RecordId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        content: RecordContent {
            name: RecordName::from_stored(row.record_name),
            record_type,
            value: RecordValue::from_stored(row.record_value),
            ttl: Ttl::from_stored(non_negative(row.ttl)),
        },
        remote_id: row.remote_record_id.and_then(RemoteRecordId::new),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn record_to_row(record: &DnsRecord) -> RecordRow {
    RecordRow {
        id: *record.id.as_uuid(),
        user_id: *record.user_id.as_uuid(),
        record_name: record.content.name.to_string(),
        record_type: record.content.record_type.as_str().to_owned(),
        record_value: record.content.value.as_ref().to_owned(),
        ttl: saturating_i32(record.content.ttl.seconds()),
        is_active: record.is_active(),
        remote_record_id: record.remote_id.as_ref().map(ToString::to_string),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[async_trait]
impl RecordRepository for DieselRecordRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<DnsRecord>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecordRow> = records::table
            .filter(records::id.eq(id.as_uuid()))
            .select(RecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn find_by_name_and_type(
        &self,
        name: &RecordName,
        record_type: RecordType,
    ) -> Result<Option<DnsRecord>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecordRow> = records::table
            .filter(records::record_name.eq(name.as_ref()))
            .filter(records::record_type.eq(record_type.as_str()))
            .select(RecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<DnsRecord>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecordRow> = records::table
            .filter(records::user_id.eq(user_id.as_uuid()))
            .select(RecordRow::as_select())
            .order_by((records::created_at.asc(), records::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn name_exists(&self, name: &RecordName) -> Result<bool, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            records::table.filter(records::record_name.eq(name.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(&self, record: &DnsRecord) -> Result<(), RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(records::table)
            .values(&record_to_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, record))
    }

    async fn update(
        &self,
        record: &DnsRecord,
        expected_remote_id: Option<RemoteRecordId>,
    ) -> Result<(), RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = RecordUpdate {
            record_name: record.content.name.as_ref(),
            record_type: record.content.record_type.as_str(),
            record_value: record.content.value.as_ref(),
            ttl: saturating_i32(record.content.ttl.seconds()),
            is_active: record.is_active(),
            remote_record_id: record.remote_id.as_ref().map(AsRef::as_ref),
            updated_at: Utc::now(),
        };
        let expected = expected_remote_id.as_ref().map(AsRef::as_ref);
        let updated = diesel::update(
            records::table
                .filter(records::id.eq(record.id.as_uuid()))
                .filter(records::remote_record_id.is_not_distinct_from(expected)),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(|err| map_write_error(err, record))?;
        if updated > 0 {
            return Ok(());
        }
        let still_stored: bool = diesel::select(exists(
            records::table.filter(records::id.eq(record.id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if still_stored {
            Err(RecordRepositoryError::stale(record.id.to_string()))
        } else {
            Err(RecordRepositoryError::missing(record.id.to_string()))
        }
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(records::table.filter(records::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
