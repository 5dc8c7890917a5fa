//! DNS record HTTP handlers.
//!
//! ```text
//! POST   /api/v1/records
//! GET    /api/v1/records
//! GET    /api/v1/records/{id}
//! PUT    /api/v1/records/{id}
//! DELETE /api/v1/records/{id}
//! POST   /api/v1/records/checkavailability
//! ```
//!
//! Bodies use snake_case field names. Every endpoint except the
//! availability check needs a signed-in session.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DnsRecord;
use crate::domain::ports::{CreateRecordRequest, RecordChange, UpdateRecordRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_record_id, require_text};

/// Request payload for creating a record.
///
/// Example JSON:
/// `{"record_name":"alice","record_type":"A","record_value":"192.0.2.10","ttl":300,"is_active":true}`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateRecordBody {
    /// Relative (`alice`) or fully-qualified (`alice.btwarch.me`) name.
    #[schema(example = "alice")]
    pub record_name: String,
    #[schema(example = "A")]
    pub record_type: String,
    #[schema(example = "192.0.2.10")]
    pub record_value: String,
    /// Seconds; omitted or `0` selects the provider's automatic TTL.
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub is_active: bool,
}

/// Partial update of a record. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateRecordBody {
    pub record_name: Option<String>,
    pub record_type: Option<String>,
    pub record_value: Option<String>,
    pub ttl: Option<u32>,
    pub is_active: Option<bool>,
}

/// A stored record as returned to its owner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecordBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(example = "alice.btwarch.me")]
    pub record_name: String,
    #[schema(example = "A")]
    pub record_type: String,
    #[schema(example = "192.0.2.10")]
    pub record_value: String,
    /// `1` means automatic.
    pub ttl: u32,
    pub is_active: bool,
    /// Provider id; present exactly when the record is published.
    pub cloudflare_record_id: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<DnsRecord> for RecordBody {
    fn from(record: DnsRecord) -> Self {
        let is_active = record.is_active();
        Self {
            id: record.id.to_string(),
            user_id: record.user_id.to_string(),
            record_name: record.content.name.to_string(),
            record_type: record.content.record_type.to_string(),
            record_value: record.content.value.as_ref().to_owned(),
            ttl: record.content.ttl.seconds(),
            is_active,
            cloudflare_record_id: record.remote_id.map(|id| id.to_string()),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Records owned by the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordListBody {
    pub records: Vec<RecordBody>,
    #[schema(example = "records fetched successfully")]
    pub message: String,
}

/// Result of deleting a record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeletedRecordBody {
    #[schema(example = "record deleted successfully")]
    pub message: String,
    pub record: RecordBody,
}

/// Availability check request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvailabilityRequest {
    #[schema(example = "alice.btwarch.me")]
    pub record_name: String,
}

/// Availability check response.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

fn record_id_from_path(raw: &str) -> ApiResult<crate::domain::RecordId> {
    parse_record_id(raw, FieldName::new("id"))
}

/// Create a record, or update the caller's existing record with the same
/// name and type.
///
/// Active records are published to the DNS provider before they are stored.
#[utoipa::path(
    post,
    path = "/api/v1/records",
    request_body = CreateRecordBody,
    responses(
        (status = 201, description = "Record created", body = RecordBody),
        (status = 200, description = "Existing record updated", body = RecordBody),
        (status = 400, description = "Invalid name, type, value or placement", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Subdomain not claimed by caller", body = ErrorSchema),
        (status = 409, description = "Record belongs to another user", body = ErrorSchema),
        (status = 502, description = "DNS provider failure", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "createRecord",
    security(("SessionCookie" = []))
)]
#[post("/records")]
pub async fn create_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRecordBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let body = payload.into_inner();
    require_text(&body.record_name, FieldName::new("record_name"))?;
    require_text(&body.record_type, FieldName::new("record_type"))?;
    require_text(&body.record_value, FieldName::new("record_value"))?;

    let RecordChange { record, created } = state
        .records
        .create(CreateRecordRequest {
            user_id,
            name: body.record_name,
            record_type: body.record_type,
            value: body.record_value,
            ttl: body.ttl,
            active: body.is_active,
        })
        .await?;

    let mut response = if created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(RecordBody::from(record)))
}

/// List the caller's records, oldest first. An empty list is not an error.
#[utoipa::path(
    get,
    path = "/api/v1/records",
    responses(
        (status = 200, description = "Records", body = RecordListBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "listRecords",
    security(("SessionCookie" = []))
)]
#[get("/records")]
pub async fn list_records(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RecordListBody>> {
    let user_id = session.require_user_id()?;
    let records = state.records_query.list(&user_id).await?;
    Ok(web::Json(RecordListBody {
        records: records.into_iter().map(RecordBody::from).collect(),
        message: "records fetched successfully".to_owned(),
    }))
}

/// Fetch one of the caller's records.
#[utoipa::path(
    get,
    path = "/api/v1/records/{id}",
    params(("id" = String, Path, format = "uuid", description = "Record id")),
    responses(
        (status = 200, description = "Record", body = RecordBody),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "getRecord",
    security(("SessionCookie" = []))
)]
#[get("/records/{id}")]
pub async fn get_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecordBody>> {
    let user_id = session.require_user_id()?;
    let record_id = record_id_from_path(&path)?;
    let record = state.records_query.get(&user_id, &record_id).await?;
    Ok(web::Json(RecordBody::from(record)))
}

/// Change a record's content or toggle its publication.
///
/// Deactivation removes the record from the DNS provider first; when that
/// fails the stored record is left untouched.
#[utoipa::path(
    put,
    path = "/api/v1/records/{id}",
    params(("id" = String, Path, format = "uuid", description = "Record id")),
    request_body = UpdateRecordBody,
    responses(
        (status = 200, description = "Updated record", body = RecordBody),
        (status = 400, description = "Invalid change", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Subdomain not claimed by caller", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 409, description = "Name and type already used, or record changed concurrently", body = ErrorSchema),
        (status = 502, description = "DNS provider failure", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "updateRecord",
    security(("SessionCookie" = []))
)]
#[put("/records/{id}")]
pub async fn update_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateRecordBody>,
) -> ApiResult<web::Json<RecordBody>> {
    let user_id = session.require_user_id()?;
    let record_id = record_id_from_path(&path)?;
    let body = payload.into_inner();
    let record = state
        .records
        .update(UpdateRecordRequest {
            user_id,
            record_id,
            name: body.record_name,
            record_type: body.record_type,
            value: body.record_value,
            ttl: body.ttl,
            active: body.is_active,
        })
        .await?;
    Ok(web::Json(RecordBody::from(record)))
}

/// Remove a record from the DNS provider and then from storage.
#[utoipa::path(
    delete,
    path = "/api/v1/records/{id}",
    params(("id" = String, Path, format = "uuid", description = "Record id")),
    responses(
        (status = 200, description = "Deleted record", body = DeletedRecordBody),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 502, description = "DNS provider failure; record kept", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "deleteRecord",
    security(("SessionCookie" = []))
)]
#[delete("/records/{id}")]
pub async fn delete_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedRecordBody>> {
    let user_id = session.require_user_id()?;
    let record_id = record_id_from_path(&path)?;
    let record = state.records.delete(&user_id, &record_id).await?;
    Ok(web::Json(DeletedRecordBody {
        message: "record deleted successfully".to_owned(),
        record: RecordBody::from(record),
    }))
}

/// Report whether any record already uses a name. No session required.
#[utoipa::path(
    post,
    path = "/api/v1/records/checkavailability",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability", body = AvailabilityResponse),
        (status = 400, description = "Missing name", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "checkAvailability",
    security([])
)]
#[post("/records/checkavailability")]
pub async fn check_availability(
    state: web::Data<HttpState>,
    payload: web::Json<AvailabilityRequest>,
) -> ApiResult<web::Json<AvailabilityResponse>> {
    let AvailabilityRequest { record_name } = payload.into_inner();
    require_text(&record_name, FieldName::new("record_name"))?;
    let available = state.records_query.check_availability(&record_name).await?;
    Ok(web::Json(AvailabilityResponse { available }))
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
