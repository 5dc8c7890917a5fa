//! Reqwest-backed GitHub OAuth web-flow client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use zeroize::Zeroizing;

use super::dto::{ProfileDto, TokenRequestDto, TokenResponseDto};
use crate::domain::GitHubAccount;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_BASE: &str = "https://api.github.com";
const SCOPE: &str = "read:user user:email";
const USER_AGENT: &str = "subdomain-registry/0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth application credentials and endpoints.
#[derive(Clone)]
pub struct GitHubOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<Zeroizing<String>>,
    pub redirect_url: Option<String>,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GitHubOAuthConfig {
    /// Credentials against the public github.com endpoints.
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_url: Option<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret: client_secret.map(Zeroizing::new),
            redirect_url,
            authorize_url: AUTHORIZE_URL.to_owned(),
            token_url: TOKEN_URL.to_owned(),
            api_base: API_BASE.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for GitHubOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubOAuthConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("redirect_url", &self.redirect_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Identity provider backed by GitHub's OAuth apps flow.
pub struct GitHubOAuthClient {
    client: Client,
    config: GitHubOAuthConfig,
}

impl GitHubOAuthClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: GitHubOAuthConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    fn credentials(&self) -> Result<(&str, &str, &str), IdentityProviderError> {
        let client_id = required(self.config.client_id.as_deref(), "client id")?;
        let secret = required(
            self.config.client_secret.as_ref().map(|s| s.as_str()),
            "client secret",
        )?;
        let redirect = required(self.config.redirect_url.as_deref(), "redirect URL")?;
        Ok((client_id, secret, redirect))
    }

    async fn fetch_token(&self, code: &str) -> Result<Zeroizing<String>, IdentityProviderError> {
        let (client_id, client_secret, redirect_uri) = self.credentials()?;
        let response = self
            .client
            .post(self.config.token_url.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&TokenRequestDto {
                client_id,
                client_secret,
                code,
                redirect_uri,
            })
            .send()
            .await
            .map_err(|error| IdentityProviderError::exchange(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityProviderError::exchange(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }
        let body: TokenResponseDto = response
            .json()
            .await
            .map_err(|error| IdentityProviderError::exchange(error.to_string()))?;
        token_from_response(body)
    }

    async fn fetch_profile(&self, token: &str) -> Result<ProfileDto, IdentityProviderError> {
        let url = format!("{}/user", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|error| IdentityProviderError::profile(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityProviderError::profile(format!(
                "GitHub API returned status {}",
                status.as_u16()
            )));
        }
        response
            .json()
            .await
            .map_err(|error| IdentityProviderError::profile(error.to_string()))
    }
}

fn required<'a>(
    value: Option<&'a str>,
    name: &str,
) -> Result<&'a str, IdentityProviderError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| IdentityProviderError::configuration(format!("GitHub {name} is not set")))
}

fn token_from_response(
    body: TokenResponseDto,
) -> Result<Zeroizing<String>, IdentityProviderError> {
    if let Some(error) = body.error {
        let detail = body.error_description.unwrap_or(error);
        return Err(IdentityProviderError::exchange(detail));
    }
    body.access_token
        .filter(|token| !token.is_empty())
        .map(Zeroizing::new)
        .ok_or_else(|| IdentityProviderError::exchange("no access token issued"))
}

#[async_trait]
impl IdentityProvider for GitHubOAuthClient {
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError> {
        let (client_id, _, redirect_uri) = self.credentials()?;
        let url = Url::parse_with_params(
            self.config.authorize_url.as_str(),
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("scope", SCOPE),
                ("state", state),
            ],
        )
        .map_err(|error| IdentityProviderError::configuration(error.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<GitHubAccount, IdentityProviderError> {
        let token = self.fetch_token(code).await?;
        let profile = self.fetch_profile(token.as_str()).await?;
        Ok(GitHubAccount {
            github_id: profile.id,
            username: profile.login,
            email: profile.email,
            avatar_url: profile.avatar_url,
            access_token: token,
        })
    }
}
