//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod auth;
pub mod claims;
pub mod error;
pub mod health;
pub mod records;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;

/// Register the handlers served under `/api/v1`.
///
/// Literal `/records/...` paths are registered before `/records/{id}` so
/// they are not captured as record ids.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(claims::claim_subdomain)
        .service(claims::current_claim)
        .service(claims::release_claim)
        .service(records::check_availability)
        .service(records::create_record)
        .service(records::list_records)
        .service(records::get_record)
        .service(records::update_record)
        .service(records::delete_record)
        .service(auth::github_login)
        .service(auth::github_callback)
        .service(auth::current_user)
        .service(auth::logout);
}
