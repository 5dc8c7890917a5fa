//! PostgreSQL-backed `ClaimRepository` implementation using Diesel ORM.
//!
//! Uniqueness of `user_id` and `subdomain_name` is enforced by named
//! constraints; violations are reported as the matching port variants.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ClaimRepository, ClaimRepositoryError};
use crate::domain::{ClaimId, SubdomainClaim, SubdomainLabel, UserId};
use crate::query_optional;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error, unique_violation};
use super::models::ClaimRow;
use super::pool::{DbPool, PoolError};
use super::schema::subdomain_claims;

const USER_CONSTRAINT: &str = "subdomain_claims_user_id_key";
const LABEL_CONSTRAINT: &str = "subdomain_claims_subdomain_name_key";

/// Diesel-backed implementation of the `ClaimRepository` port.
#[derive(Clone)]
pub struct DieselClaimRepository {
    pool: DbPool,
}

impl DieselClaimRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ClaimRepositoryError {
    map_basic_pool_error(error, ClaimRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ClaimRepositoryError {
    map_basic_diesel_error(
        error,
        ClaimRepositoryError::query,
        ClaimRepositoryError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, claim: &SubdomainClaim) -> ClaimRepositoryError {
    let constraint = unique_violation(&error).map(str::to_owned);
    match constraint.as_deref() {
        Some(USER_CONSTRAINT) => ClaimRepositoryError::user_already_claimed(),
        Some(LABEL_CONSTRAINT) => ClaimRepositoryError::label_taken(claim.label.as_ref()),
        Some(other) => {
            warn!(constraint = other, "unrecognised unique violation on subdomain_claims");
            ClaimRepositoryError::query("unique constraint violated")
        }
        None => map_diesel_error(error),
    }
}

fn row_to_claim(row: ClaimRow) -> SubdomainClaim {
    SubdomainClaim {
        id: ClaimId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        label: SubdomainLabel::from_stored(row.subdomain_name),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl ClaimRepository for DieselClaimRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubdomainClaim>, ClaimRepositoryError> {
        query_optional!(
            self,
            subdomain_claims::table,
            subdomain_claims::user_id.eq(user_id.as_uuid()),
            ClaimRow,
            row_to_claim,
            map_pool_error,
            map_diesel_error
        )
    }

    async fn find_by_label(
        &self,
        label: &SubdomainLabel,
    ) -> Result<Option<SubdomainClaim>, ClaimRepositoryError> {
        query_optional!(
            self,
            subdomain_claims::table,
            subdomain_claims::subdomain_name.eq(label.as_ref()),
            ClaimRow,
            row_to_claim,
            map_pool_error,
            map_diesel_error
        )
    }

    async fn insert(&self, claim: &SubdomainClaim) -> Result<(), ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ClaimRow {
            id: *claim.id.as_uuid(),
            user_id: *claim.user_id.as_uuid(),
            subdomain_name: claim.label.to_string(),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        };

        diesel::insert_into(subdomain_claims::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, claim))
    }

    async fn delete(&self, id: &ClaimId) -> Result<bool, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = subdomain_claims::table.filter(subdomain_claims::id.eq(id.as_uuid()));
        let removed = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
