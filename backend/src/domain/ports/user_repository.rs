//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{GitHubAccount, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the user for a GitHub account, or refresh the stored profile
    /// and access token when the account signed in before.
    async fn upsert_github_account(
        &self,
        account: &GitHubAccount,
    ) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}
