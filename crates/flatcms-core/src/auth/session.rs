use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::credentials::CredentialStore;
use crate::error::{Error, Result};

/// Sign-in state of one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(String),
}

impl AuthState {
    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(name) => Some(name),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Per-session state: who is signed in plus a one-shot flash message.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub auth: AuthState,
    message: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            auth: AuthState::Anonymous,
            message: None,
            last_seen: Utc::now(),
        }
    }
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the session has been idle for longer than `idle_minutes`.
    pub fn is_expired(&self, idle_minutes: i64) -> bool {
        Utc::now() > self.last_seen + Duration::minutes(idle_minutes)
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Take the pending flash message, clearing it.
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn username(&self) -> Option<&str> {
        self.auth.username()
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Sign in with a username/password pair.
    ///
    /// On failure the authentication state is left as it was.
    pub fn sign_in(&mut self, store: &CredentialStore, username: &str, password: &str) -> Result<()> {
        if store.verify(username, password)? {
            info!(user = %username, "Signed in");
            self.auth = AuthState::Authenticated(username.to_string());
            Ok(())
        } else {
            warn!(user = %username, "Failed sign-in attempt");
            Err(Error::InvalidCredentials)
        }
    }

    pub fn sign_out(&mut self) {
        if let AuthState::Authenticated(ref name) = self.auth {
            info!(user = %name, "Signed out");
        }
        self.auth = AuthState::Anonymous;
    }

    /// Create an account and sign it in.
    pub fn register(&mut self, store: &CredentialStore, username: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "A username and password is required.".to_string(),
            ));
        }
        if store.exists(username)? {
            return Err(Error::DuplicateUser(username.to_string()));
        }

        store.create(username, password)?;
        self.auth = AuthState::Authenticated(username.to_string());
        Ok(())
    }

    /// Guard for mutating operations. Yields the signed-in username.
    pub fn require_authenticated(&self) -> Result<&str> {
        self.auth.username().ok_or(Error::NotAuthenticated)
    }
}
