//! DTOs for the GitHub OAuth token endpoint and the `/user` API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct TokenRequestDto<'a> {
    pub(super) client_id: &'a str,
    pub(super) client_secret: &'a str,
    pub(super) code: &'a str,
    pub(super) redirect_uri: &'a str,
}

/// GitHub answers 200 for rejected codes and reports them in `error`.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: Option<String>,
    pub(super) error: Option<String>,
    pub(super) error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProfileDto {
    pub(super) id: i64,
    pub(super) login: String,
    pub(super) email: Option<String>,
    pub(super) avatar_url: Option<String>,
}
