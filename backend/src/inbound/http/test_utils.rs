//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use crate::domain::UserId;
use crate::domain::ports::{
    MockLoginService, MockRecordsCommand, MockRecordsQuery, MockSubdomainClaims,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

pub const ALICE: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const SIGN_IN_PATH: &str = "/test/sign-in/{user_id}";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Ports whose mocks expect nothing; tests replace the one they exercise.
pub struct MockPorts {
    pub login: MockLoginService,
    pub claims: MockSubdomainClaims,
    pub records: MockRecordsCommand,
    pub records_query: MockRecordsQuery,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            login: MockLoginService::new(),
            claims: MockSubdomainClaims::new(),
            records: MockRecordsCommand::new(),
            records_query: MockRecordsQuery::new(),
        }
    }
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            HttpStatePorts {
                login: Arc::new(self.login),
                claims: Arc::new(self.claims),
                records: Arc::new(self.records),
                records_query: Arc::new(self.records_query),
            },
            "/dashboard",
        ))
    }
}

/// Handler mounted at [`SIGN_IN_PATH`] that stores the path's user id in the
/// session, standing in for a completed OAuth callback.
pub async fn sign_in_handler(
    session: SessionContext,
    user_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::new(user_id.into_inner())
        .map_err(|error| crate::domain::Error::invalid_request(error.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign `user_id` in through [`sign_in_handler`] and return the session cookie.
pub async fn sign_in<S>(app: &S, user_id: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::get()
        .uri(&format!("/test/sign-in/{user_id}"))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "sign-in failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

pub fn alice() -> UserId {
    UserId::new(ALICE).expect("fixture user id")
}
