//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{records, subdomain_claims, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub github_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Insertable struct for first logins.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub github_id: i64,
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub access_token: &'a str,
}

// ---------------------------------------------------------------------------
// Claim models
// ---------------------------------------------------------------------------

/// Row struct for reading and inserting subdomain claims.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subdomain_claims)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClaimRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subdomain_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Record models
// ---------------------------------------------------------------------------

/// Row struct for reading and inserting records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record_name: String,
    pub record_type: String,
    pub record_value: String,
    pub ttl: i32,
    pub is_active: bool,
    pub remote_record_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full content and publication update. `remote_record_id` must be written
/// as NULL on deactivation, hence `treat_none_as_null`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = records)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RecordUpdate<'a> {
    pub record_name: &'a str,
    pub record_type: &'a str,
    pub record_value: &'a str,
    pub ttl: i32,
    pub is_active: bool,
    pub remote_record_id: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
