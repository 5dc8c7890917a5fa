//! User accounts held in process memory.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{GitHubAccount, User, UserId};

/// Users keyed by GitHub id. Access tokens are not retained.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing the login flow.
    pub async fn seed(&self, user: User) {
        self.users.lock().await.push(user);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn upsert_github_account(
        &self,
        account: &GitHubAccount,
    ) -> Result<User, UserPersistenceError> {
        let mut users = self.users.lock().await;
        if let Some(existing) = users.iter_mut().find(|u| u.github_id == account.github_id) {
            existing.username.clone_from(&account.username);
            existing.email.clone_from(&account.email);
            existing.avatar_url.clone_from(&account.avatar_url);
            return Ok(existing.clone());
        }
        let user = User {
            id: UserId::random(),
            github_id: account.github_id,
            username: account.username.clone(),
            email: account.email.clone(),
            avatar_url: account.avatar_url.clone(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }
}
