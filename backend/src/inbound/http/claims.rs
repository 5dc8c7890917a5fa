//! Subdomain claim HTTP handlers.
//!
//! ```text
//! POST   /api/v1/records/claim {"subdomain_name":"alice"}
//! GET    /api/v1/records/claim
//! DELETE /api/v1/records/claim
//! ```
//!
//! These share the `/records` prefix, so they are registered ahead of the
//! `/records/{id}` handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::ClaimedSubdomain;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_text};

/// Claim request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ClaimRequest {
    #[schema(example = "alice")]
    pub subdomain_name: String,
}

/// A stored claim.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClaimBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(example = "alice")]
    pub subdomain_name: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

/// Claim plus the fully-qualified domain it reserves.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ClaimResponse {
    #[schema(example = "subdomain claimed successfully")]
    pub message: String,
    pub claim: ClaimBody,
    #[schema(example = "alice.btwarch.me")]
    pub full_domain: String,
}

impl ClaimResponse {
    fn new(message: &str, claimed: ClaimedSubdomain) -> Self {
        let ClaimedSubdomain {
            claim,
            full_domain,
        } = claimed;
        Self {
            message: message.to_owned(),
            claim: ClaimBody {
                id: claim.id.to_string(),
                user_id: claim.user_id.to_string(),
                subdomain_name: claim.label.to_string(),
                created_at: claim.created_at.to_rfc3339(),
                updated_at: claim.updated_at.to_rfc3339(),
            },
            full_domain,
        }
    }
}

/// Reserve a subdomain label for the caller. One claim per user.
#[utoipa::path(
    post,
    path = "/api/v1/records/claim",
    request_body = ClaimRequest,
    responses(
        (status = 201, description = "Subdomain claimed", body = ClaimResponse),
        (status = 400, description = "Invalid label", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Caller already holds a claim or label taken", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "claimSubdomain",
    security(("SessionCookie" = []))
)]
#[post("/records/claim")]
pub async fn claim_subdomain(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ClaimRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let ClaimRequest { subdomain_name } = payload.into_inner();
    require_text(&subdomain_name, FieldName::new("subdomain_name"))?;
    let claimed = state.claims.claim(&user_id, &subdomain_name).await?;
    Ok(HttpResponse::Created().json(ClaimResponse::new("subdomain claimed successfully", claimed)))
}

/// The caller's current claim.
#[utoipa::path(
    get,
    path = "/api/v1/records/claim",
    responses(
        (status = 200, description = "Current claim", body = ClaimResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No claim", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "getClaim",
    security(("SessionCookie" = []))
)]
#[get("/records/claim")]
pub async fn current_claim(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ClaimResponse>> {
    let user_id = session.require_user_id()?;
    let claimed = state
        .claims
        .claim_for_user(&user_id)
        .await?
        .ok_or_else(|| {
            Error::not_found("no subdomain claim found")
                .with_details(serde_json::json!({ "code": "no_claim" }))
        })?;
    Ok(web::Json(ClaimResponse::new("subdomain claim found", claimed)))
}

/// Give up the caller's claim. Records under the label are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/records/claim",
    responses(
        (status = 200, description = "Claim released", body = ClaimResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No claim", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "releaseClaim",
    security(("SessionCookie" = []))
)]
#[delete("/records/claim")]
pub async fn release_claim(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ClaimResponse>> {
    let user_id = session.require_user_id()?;
    let released = state.claims.release(&user_id).await?;
    Ok(web::Json(ClaimResponse::new(
        "subdomain claim deleted successfully",
        released,
    )))
}
