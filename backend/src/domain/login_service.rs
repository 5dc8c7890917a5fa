//! GitHub login service implementing the [`LoginService`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, LoginService, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, User, UserId};

/// Signs users in through an identity provider and keeps their profile.
#[derive(Clone)]
pub struct GitHubLoginService<U, P> {
    users: Arc<U>,
    provider: Arc<P>,
}

impl<U, P> GitHubLoginService<U, P> {
    /// Create a login service over the user store and identity provider.
    pub fn new(users: Arc<U>, provider: Arc<P>) -> Self {
        Self { users, provider }
    }
}

fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Configuration { message } => {
            Error::internal(format!("identity provider misconfigured: {message}"))
        }
        IdentityProviderError::Exchange { message } => {
            Error::unauthorized(format!("login failed: {message}"))
        }
        IdentityProviderError::Profile { message } => {
            Error::bad_gateway(format!("could not load GitHub profile: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

#[async_trait]
impl<U, P> LoginService for GitHubLoginService<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    fn authorization_url(&self, state: &str) -> Result<String, Error> {
        self.provider
            .authorization_url(state)
            .map_err(map_identity_error)
    }

    async fn complete_login(&self, code: &str) -> Result<User, Error> {
        let account = self
            .provider
            .exchange_code(code)
            .await
            .map_err(map_identity_error)?;
        let user = self
            .users
            .upsert_github_account(&account)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, github_id = user.github_id, "user signed in");
        Ok(user)
    }

    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::GitHubAccount;
    use crate::domain::ports::{MockIdentityProvider, MockUserRepository};
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn account() -> GitHubAccount {
        GitHubAccount {
            github_id: 42,
            username: "octocat".to_owned(),
            email: None,
            avatar_url: Some("https://avatars.example/42".to_owned()),
            access_token: Zeroizing::new("gho_secret".to_owned()),
        }
    }

    fn user_for(account: &GitHubAccount) -> User {
        User {
            id: UserId::random(),
            github_id: account.github_id,
            username: account.username.clone(),
            email: account.email.clone(),
            avatar_url: account.avatar_url.clone(),
        }
    }

    #[tokio::test]
    async fn complete_login_upserts_the_account() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_exchange_code()
            .withf(|code| code == "abc")
            .times(1)
            .return_once(|_| Ok(account()));
        let mut users = MockUserRepository::new();
        users
            .expect_upsert_github_account()
            .withf(|account| account.github_id == 42 && account.access_token.as_str() == "gho_secret")
            .times(1)
            .return_once(|account| Ok(user_for(account)));

        let service = GitHubLoginService::new(Arc::new(users), Arc::new(provider));
        let user = service.complete_login("abc").await.expect("login");
        assert_eq!(user.username, "octocat");
    }

    #[rstest]
    #[case(IdentityProviderError::exchange("bad_verification_code"), ErrorCode::Unauthorized)]
    #[case(IdentityProviderError::profile("502"), ErrorCode::BadGateway)]
    #[case(IdentityProviderError::configuration("client id"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn provider_failures_map_to_error_codes(
        #[case] failure: IdentityProviderError,
        #[case] expected: ErrorCode,
    ) {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_exchange_code()
            .return_once(move |_| Err(failure));
        let mut users = MockUserRepository::new();
        users.expect_upsert_github_account().never();

        let service = GitHubLoginService::new(Arc::new(users), Arc::new(provider));
        let err = service.complete_login("abc").await.expect_err("fails");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn vanished_session_user_is_unauthorised() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        let service = GitHubLoginService::new(Arc::new(users), Arc::new(MockIdentityProvider::new()));

        let err = service
            .current_user(&UserId::random())
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
