//! In-process session store keyed by a random cookie id.
//!
//! Each request extracts a [`RequestContext`] holding a copy of its session
//! data; handlers mutate it and hand it back through
//! [`RequestContext::commit`], which stores the data and sets the cookie for
//! new sessions.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use flatcms_core::SessionData;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::debug;

use crate::app::AppState;

pub const SESSION_COOKIE: &str = "flatcms_session";

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionData>>>,
    idle_minutes: i64,
}

impl SessionStore {
    pub fn new(idle_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_minutes,
        }
    }

    /// Look up the session named by the request cookie, or start a new one.
    pub fn open(&self, headers: &HeaderMap) -> RequestContext {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, data| !data.is_expired(self.idle_minutes));
        if sessions.len() != before {
            debug!(expired = before - sessions.len(), "Pruned idle sessions");
        }

        if let Some(id) = session_id_from(headers) {
            if let Some(data) = sessions.get(&id) {
                return RequestContext {
                    id,
                    session: data.clone(),
                    is_new: false,
                };
            }
        }

        RequestContext {
            id: new_session_id(),
            session: SessionData::new(),
            is_new: true,
        }
    }

    fn put(&self, id: String, data: SessionData) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.insert(id, data);
    }

    fn remove(&self, id: &str) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn new_session_id() -> String {
    format!("{:032x}", OsRng.gen::<u128>())
}

fn session_id_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Request-scoped session state.
pub struct RequestContext {
    id: String,
    pub session: SessionData,
    is_new: bool,
}

impl RequestContext {
    /// Move the session to a fresh id and retire the old one. Done on every
    /// change of identity.
    pub fn rotate(&mut self, sessions: &SessionStore) {
        sessions.remove(&self.id);
        self.id = new_session_id();
        self.is_new = true;
        debug!("Rotated session id");
    }

    /// Store the (possibly modified) session and attach the cookie.
    pub fn commit(mut self, sessions: &SessionStore, response: impl IntoResponse) -> Response {
        self.session.touch();
        let mut response = response.into_response();
        if self.is_new {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                SESSION_COOKIE, self.id
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        sessions.put(self.id, self.session);
        response
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.open(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let headers = cookie_headers("theme=dark; flatcms_session=abc123; other=1");
        assert_eq!(session_id_from(&headers).as_deref(), Some("abc123"));
        assert_eq!(session_id_from(&HeaderMap::new()), None);
        assert_eq!(session_id_from(&cookie_headers("theme=dark")), None);
    }

    #[test]
    fn test_new_session_ids_are_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_commit_then_open_restores_session() {
        let store = SessionStore::new(60);
        let mut ctx = store.open(&HeaderMap::new());
        assert!(ctx.is_new);
        ctx.session.set_message("hello");
        let id = ctx.id.clone();

        let response = ctx.commit(&store, "ok");
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("{}={}", SESSION_COOKIE, id)));
        assert!(set_cookie.contains("HttpOnly"));

        let mut ctx = store.open(&cookie_headers(&format!("{}={}", SESSION_COOKIE, id)));
        assert!(!ctx.is_new);
        assert_eq!(ctx.session.take_message().as_deref(), Some("hello"));

        // Existing sessions do not get a new cookie
        let response = ctx.commit(&store, "ok");
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_rotate_retires_old_id() {
        let store = SessionStore::new(60);
        let ctx = store.open(&HeaderMap::new());
        let old_id = ctx.id.clone();
        ctx.commit(&store, "ok");

        let mut ctx = store.open(&cookie_headers(&format!("{}={}", SESSION_COOKIE, old_id)));
        ctx.session.set_message("carried over");
        ctx.rotate(&store);
        let new_id = ctx.id.clone();
        assert_ne!(new_id, old_id);

        let response = ctx.commit(&store, "ok");
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("{}={}", SESSION_COOKIE, new_id)));
        assert_eq!(store.len(), 1);

        let stale = store.open(&cookie_headers(&format!("{}={}", SESSION_COOKIE, old_id)));
        assert!(stale.is_new);

        let mut fresh = store.open(&cookie_headers(&format!("{}={}", SESSION_COOKIE, new_id)));
        assert!(!fresh.is_new);
        assert_eq!(fresh.session.take_message().as_deref(), Some("carried over"));
    }

    #[test]
    fn test_unknown_cookie_starts_fresh_session() {
        let store = SessionStore::new(60);
        let ctx = store.open(&cookie_headers("flatcms_session=forged"));
        assert!(ctx.is_new);
        assert_ne!(ctx.id, "forged");
    }

    #[test]
    fn test_idle_sessions_are_pruned() {
        let store = SessionStore::new(60);
        let ctx = store.open(&HeaderMap::new());
        let id = ctx.id.clone();
        ctx.commit(&store, "ok");
        assert_eq!(store.len(), 1);

        store
            .sessions
            .lock()
            .unwrap()
            .get_mut(&id)
            .unwrap()
            .last_seen = Utc::now() - Duration::minutes(61);

        let ctx = store.open(&cookie_headers(&format!("{}={}", SESSION_COOKIE, id)));
        assert!(ctx.is_new);
        assert!(store.is_empty());
    }
}
