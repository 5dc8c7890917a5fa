//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: claim, record, auth and health endpoints from the inbound
//!   layer
//! - **Schemas**: request and response bodies, plus domain type wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`], [`UserSchema`]) that keep utoipa
//!   out of the domain
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is served by Swagger UI in debug builds.

use crate::inbound::http::claims::{ClaimBody, ClaimRequest, ClaimResponse};
use crate::inbound::http::records::{
    AvailabilityRequest, AvailabilityResponse, CreateRecordBody, DeletedRecordBody, RecordBody,
    RecordListBody, UpdateRecordBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, UserSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by GET /api/v1/auth/github/callback.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Subdomain registry API",
        description = "Claim a subdomain and manage its DNS records, mirrored to Cloudflare."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::claims::claim_subdomain,
        crate::inbound::http::claims::current_claim,
        crate::inbound::http::claims::release_claim,
        crate::inbound::http::records::create_record,
        crate::inbound::http::records::list_records,
        crate::inbound::http::records::get_record,
        crate::inbound::http::records::update_record,
        crate::inbound::http::records::delete_record,
        crate::inbound::http::records::check_availability,
        crate::inbound::http::auth::github_login,
        crate::inbound::http::auth::github_callback,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserSchema,
        ErrorSchema,
        ErrorCodeSchema,
        ClaimRequest,
        ClaimBody,
        ClaimResponse,
        CreateRecordBody,
        UpdateRecordBody,
        RecordBody,
        RecordListBody,
        DeletedRecordBody,
        AvailabilityRequest,
        AvailabilityResponse,
    )),
    tags(
        (name = "claims", description = "Subdomain claims, one per user"),
        (name = "records", description = "DNS records under the caller's subdomain"),
        (name = "auth", description = "GitHub sign-in and session"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn user_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user_schema = schemas.get(USER_SCHEMA_NAME).expect("User schema");

        assert_object_schema_has_field(user_schema, "id");
        assert_object_schema_has_field(user_schema, "githubId");
    }

    #[test]
    fn record_and_claim_paths_are_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/records",
            "/api/v1/records/{id}",
            "/api/v1/records/claim",
            "/api/v1/records/checkavailability",
            "/api/v1/auth/github/callback",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
