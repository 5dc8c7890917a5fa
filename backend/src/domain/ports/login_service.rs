//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! sign users in through the identity provider without importing the
//! provider client or the user store.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Where to send the browser to start a login bound to `state`.
    fn authorization_url(&self, state: &str) -> Result<String, Error>;

    /// Finish a login with the provider's authorisation code.
    async fn complete_login(&self, code: &str) -> Result<User, Error>;

    /// Load the signed-in user.
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error>;
}
