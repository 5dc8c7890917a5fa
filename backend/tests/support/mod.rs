//! Shared harness for HTTP-level registry tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the doubles here are hand-written rather than mockall-generated: the
//! library only derives mocks under `cfg(test)`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::Value;
use subdomain_registry::Trace;
use subdomain_registry::domain::ports::{
    DnsGateway, DnsGatewayError, IdentityProvider, IdentityProviderError,
};
use subdomain_registry::domain::{
    BackoffJitter, GitHubAccount, GitHubLoginService, ParentDomain, RecordContent, RecordService,
    RegistryConfig, RemoteRecordId, RetryConfig, RetryPolicy, RetrySleeper,
    SubdomainClaimService,
};
use subdomain_registry::inbound::http::api_services;
use subdomain_registry::inbound::http::state::{HttpState, HttpStatePorts};
use subdomain_registry::outbound::memory::{
    MemoryClaimRepository, MemoryRecordRepository, MemoryUserRepository,
};
use url::Url;
use zeroize::Zeroizing;

pub const PARENT_DOMAIN: &str = "btwarch.me";

/// A gateway call as observed by [`ScriptedGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Create { name: String },
    Update { remote_id: String, value: String },
    Delete { remote_id: String },
}

#[derive(Default)]
struct GatewayState {
    issued: u32,
    published: HashMap<String, String>,
    calls: Vec<GatewayCall>,
    failing_creates: bool,
    failing_deletes: bool,
}

/// In-process DNS provider issuing `cf123`, `cf124`, ... as record ids.
///
/// Every call yields once before touching provider state, so requests run
/// with `join!` interleave at the provider the way concurrent HTTP requests
/// do.
#[derive(Default)]
pub struct ScriptedGateway {
    state: Mutex<GatewayState>,
}

impl ScriptedGateway {
    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        self.state.lock().expect("gateway state lock")
    }

    /// Make every subsequent create fail with a provider rejection.
    pub fn fail_creates(&self) {
        self.lock().failing_creates = true;
    }

    /// Make every subsequent delete fail with a transient transport error.
    pub fn fail_deletes(&self) {
        self.lock().failing_deletes = true;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn delete_attempts(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, GatewayCall::Delete { .. }))
            .count()
    }

    /// Remote ids currently published.
    pub fn published(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().published.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DnsGateway for ScriptedGateway {
    async fn create(&self, content: &RecordContent) -> Result<RemoteRecordId, DnsGatewayError> {
        tokio::task::yield_now().await;
        let mut state = self.lock();
        state.calls.push(GatewayCall::Create {
            name: content.name.to_string(),
        });
        if state.failing_creates {
            return Err(DnsGatewayError::provider(
                "Record already exists.",
                Some(400_u16),
            ));
        }
        let id = format!("cf{}", 123 + state.issued);
        state.issued += 1;
        state
            .published
            .insert(id.clone(), content.value.as_ref().to_owned());
        RemoteRecordId::new(id)
            .ok_or_else(|| DnsGatewayError::provider("blank record id", None::<u16>))
    }

    async fn update(
        &self,
        remote_id: &RemoteRecordId,
        content: &RecordContent,
    ) -> Result<(), DnsGatewayError> {
        tokio::task::yield_now().await;
        let mut state = self.lock();
        let value = content.value.as_ref().to_owned();
        state.calls.push(GatewayCall::Update {
            remote_id: remote_id.to_string(),
            value: value.clone(),
        });
        match state.published.get_mut(remote_id.as_ref()) {
            Some(stored) => {
                *stored = value;
                Ok(())
            }
            None => Err(DnsGatewayError::remote_record_missing(remote_id.to_string())),
        }
    }

    async fn delete(&self, remote_id: &RemoteRecordId) -> Result<(), DnsGatewayError> {
        tokio::task::yield_now().await;
        let mut state = self.lock();
        state.calls.push(GatewayCall::Delete {
            remote_id: remote_id.to_string(),
        });
        if state.failing_deletes {
            return Err(DnsGatewayError::transport("connection reset by peer"));
        }
        match state.published.remove(remote_id.as_ref()) {
            Some(_) => Ok(()),
            None => Err(DnsGatewayError::remote_record_missing(remote_id.to_string())),
        }
    }
}

/// Identity provider that accepts any code and treats it as the GitHub login.
pub struct StubGitHub;

#[async_trait]
impl IdentityProvider for StubGitHub {
    fn authorization_url(&self, state: &str) -> Result<String, IdentityProviderError> {
        Url::parse_with_params("https://github.test/login/oauth/authorize", &[("state", state)])
            .map(String::from)
            .map_err(|error| IdentityProviderError::configuration(error.to_string()))
    }

    async fn exchange_code(&self, code: &str) -> Result<GitHubAccount, IdentityProviderError> {
        let github_id = code
            .bytes()
            .fold(7_i64, |acc, byte| acc.wrapping_mul(31).wrapping_add(i64::from(byte)));
        Ok(GitHubAccount {
            github_id,
            username: code.to_owned(),
            email: None,
            avatar_url: None,
            access_token: Zeroizing::new(format!("gho_{code}")),
        })
    }
}

struct NoSleep;

#[async_trait]
impl RetrySleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

struct NoJitter;

impl BackoffJitter for NoJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        base
    }
}

/// Memory-backed registry wired to a [`ScriptedGateway`].
pub struct Registry {
    pub gateway: Arc<ScriptedGateway>,
    state: web::Data<HttpState>,
}

impl Registry {
    pub fn new() -> Self {
        let parent = ParentDomain::new(PARENT_DOMAIN).expect("parent domain");
        let config = RegistryConfig::new(parent);
        let gateway = Arc::new(ScriptedGateway::default());
        let claims = Arc::new(MemoryClaimRepository::new());
        let records = Arc::new(MemoryRecordRepository::new());
        let retry = RetryPolicy::with_runtime(
            RetryConfig::default(),
            Arc::new(NoSleep),
            Arc::new(NoJitter),
        );
        let record_service = Arc::new(RecordService::new(
            records,
            claims.clone(),
            gateway.clone(),
            config.clone(),
            retry,
        ));
        let ports = HttpStatePorts {
            login: Arc::new(GitHubLoginService::new(
                Arc::new(MemoryUserRepository::new()),
                Arc::new(StubGitHub),
            )),
            claims: Arc::new(SubdomainClaimService::new(claims, config)),
            records: record_service.clone(),
            records_query: record_service,
        };
        Self {
            gateway,
            state: web::Data::new(HttpState::new(ports, "/dashboard")),
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<
        Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(session)
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(api_services)),
        )
        .await
    }
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Run the GitHub login round trip for `login` and return the session cookie.
pub async fn sign_in<S, B>(app: &S, login: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let start = test::call_service(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/github/login")
            .to_request(),
    )
    .await;
    assert_eq!(start.status(), StatusCode::FOUND);
    let location = start
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("authorisation redirect");
    let oauth_state = Url::parse(location)
        .expect("authorisation url")
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter");
    let pending = session_cookie(&start).expect("pending login cookie");

    let callback = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/auth/github/callback?code={login}&state={oauth_state}"
            ))
            .cookie(pending)
            .to_request(),
    )
    .await;
    assert_eq!(callback.status(), StatusCode::FOUND);
    session_cookie(&callback).expect("signed-in session cookie")
}

/// Send `req` and decode the JSON body, if any.
pub async fn call_json<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    if body.is_empty() {
        return (status, Value::Null);
    }
    let json = serde_json::from_slice(&body).expect("json body");
    (status, json)
}

/// The `details.code` of an error body.
pub fn error_code(body: &Value) -> &str {
    body.pointer("/details/code")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
