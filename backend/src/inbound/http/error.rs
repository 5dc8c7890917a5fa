//! JSON rendering of domain errors for Actix handlers.
//!
//! Error bodies are never cached. Internal failures are logged in full and
//! reach clients as a generic message; storage outages carry a `Retry-After`
//! hint.

use actix_web::http::header::{CACHE_CONTROL, RETRY_AFTER};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Seconds a client should wait before retrying after a storage outage.
pub const RETRY_AFTER_SECS: u32 = 5;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_view(error: &Error) -> Error {
    match error.code() {
        ErrorCode::InternalError => {
            error!(
                message = error.message(),
                trace_id = error.trace_id(),
                "internal error returned to client"
            );
            let redacted = Error::internal(INTERNAL_MESSAGE);
            match error.trace_id() {
                Some(id) => redacted.with_trace_id(id.to_owned()),
                None => redacted,
            }
        }
        ErrorCode::BadGateway => {
            warn!(
                code = error.detail_code(),
                message = error.message(),
                "DNS provider failure returned to client"
            );
            error.clone()
        }
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header((CACHE_CONTROL, "no-store"));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::ServiceUnavailable {
            builder.insert_header((RETRY_AFTER, RETRY_AFTER_SECS.to_string()));
        }
        builder.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(INTERNAL_MESSAGE)
    }
}
