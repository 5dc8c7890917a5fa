//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{GitHubAccount, User, UserId};
use crate::query_optional;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::from_uuid(row.id),
        github_id: row.github_id,
        username: row.username,
        email: row.email,
        avatar_url: row.avatar_url,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert_github_account(
        &self,
        account: &GitHubAccount,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            github_id: account.github_id,
            username: &account.username,
            email: account.email.as_deref(),
            avatar_url: account.avatar_url.as_deref(),
            access_token: account.access_token.as_str(),
        };

        // Single statement so concurrent first logins converge on one row.
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::github_id)
            .do_update()
            .set((
                users::username.eq(excluded(users::username)),
                users::email.eq(excluded(users::email)),
                users::avatar_url.eq(excluded(users::avatar_url)),
                users::access_token.eq(excluded(users::access_token)),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_user(row))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        query_optional!(
            self,
            users::table,
            users::id.eq(id.as_uuid()),
            UserRow,
            row_to_user,
            map_pool_error,
            map_diesel_error
        )
    }
}
