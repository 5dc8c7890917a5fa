//! GitHub OAuth login and session endpoints.
//!
//! ```text
//! GET  /api/v1/auth/github/login
//! GET  /api/v1/auth/github/callback?code=...&state=...
//! GET  /api/v1/auth/me
//! POST /api/v1/auth/logout
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use rand::RngCore;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const STATE_BYTES: usize = 32;

/// Query GitHub appends when redirecting back.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorisation code to exchange.
    pub code: Option<String>,
    /// Anti-forgery token issued by the login endpoint.
    pub state: Option<String>,
    /// Set when the user declined or GitHub refused the request.
    pub error: Option<String>,
}

fn new_oauth_state() -> String {
    let mut bytes = [0_u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Start a GitHub login.
#[utoipa::path(
    get,
    path = "/api/v1/auth/github/login",
    responses(
        (status = 302, description = "Redirect to GitHub", headers(("Location" = String, description = "GitHub authorize URL"))),
        (status = 500, description = "OAuth client is not configured", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "githubLogin",
    security([])
)]
#[get("/auth/github/login")]
pub async fn github_login(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let oauth_state = new_oauth_state();
    let url = state.login.authorization_url(&oauth_state)?;
    session.store_oauth_state(&oauth_state)?;
    Ok(redirect(&url))
}

/// Finish a GitHub login and sign the user in.
#[utoipa::path(
    get,
    path = "/api/v1/auth/github/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Signed in; redirect to the landing page", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing code", body = ErrorSchema),
        (status = 401, description = "State mismatch or code rejected", body = ErrorSchema),
        (status = 502, description = "GitHub API failure", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "githubCallback",
    security([])
)]
#[get("/auth/github/callback")]
pub async fn github_callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let CallbackQuery {
        code,
        state: returned_state,
        error,
    } = query.into_inner();
    let expected_state = session.take_oauth_state()?;

    if let Some(error) = error {
        tracing::info!(%error, "GitHub declined the login");
        return Err(Error::unauthorized(format!("GitHub login failed: {error}")));
    }
    match (expected_state, returned_state) {
        (Some(expected), Some(returned)) if expected == returned => {}
        _ => return Err(Error::unauthorized("login state mismatch; start the login again")),
    }
    let code = code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| Error::invalid_request("code is required"))?;

    let user = state.login.complete_login(&code).await?;
    session.persist_user(&user.id)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user signed in");
    Ok(redirect(&state.landing_url))
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let user = state.login.current_user(&user_id).await?;
    Ok(web::Json(user))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
