//! Driven port for the external OAuth identity provider.
use async_trait::async_trait;

use crate::domain::GitHubAccount;

use super::define_port_error;

define_port_error! {
    /// Errors raised while talking to the identity provider.
    pub enum IdentityProviderError {
        /// Client id, secret or redirect URL missing or malformed.
        Configuration { message: String } => "identity provider configuration error: {message}",
        /// Authorisation code could not be exchanged for a token.
        Exchange { message: String } => "authorisation code exchange failed: {message}",
        /// Profile lookup with the issued token failed.
        Profile { message: String } => "profile lookup failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to, embedding the anti-forgery `state`.
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError>;

    /// Exchange an authorisation code for the caller's account.
    async fn exchange_code(&self, code: &str) -> Result<GitHubAccount, IdentityProviderError>;
}
