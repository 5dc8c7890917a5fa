//! Cookie session access for registry handlers.
//!
//! The session holds two entries: the signed-in user's id and, between the
//! login redirect and the GitHub callback, the pending OAuth `state`.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const OAUTH_STATE_KEY: &str = "oauth_state";

/// Handler-facing view of the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn write(&self, key: &str, value: impl Serialize) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to write session entry {key}: {error}")))
    }

    /// Sign `user_id` in. The session id is renewed first so a cookie issued
    /// before login cannot be replayed afterwards.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.write(USER_ID_KEY, user_id.as_ref())
    }

    /// The signed-in user, if any. A malformed id is treated as signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| {
            UserId::new(&raw)
                .inspect_err(|error| tracing::warn!(%error, "discarding malformed session user id"))
                .ok()
        }))
    }

    /// The signed-in user, or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    pub fn store_oauth_state(&self, state: &str) -> Result<(), Error> {
        self.write(OAUTH_STATE_KEY, state)
    }

    /// Remove and return the pending OAuth `state`, so each one is checked
    /// at most once.
    pub fn take_oauth_state(&self) -> Result<Option<String>, Error> {
        self.0
            .remove_as::<String>(OAUTH_STATE_KEY)
            .transpose()
            .map_err(|raw| {
                tracing::warn!(%raw, "unreadable oauth state in session cookie");
                Error::unauthorized("login state is invalid; start the login again")
            })
    }

    /// Sign out: drop every entry and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
