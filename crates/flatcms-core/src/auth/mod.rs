//! Authentication: the credential store and per-session sign-in state.
//!
//! This module provides:
//! - `CredentialStore`: file-backed user records with Argon2id password hashes
//! - `SessionData`: the auth gate (anonymous / signed in) plus flash messages
//!
//! Sessions are kept in memory by the web front end and expire after a
//! configurable idle period.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, UserRecord};
pub use session::{AuthState, SessionData};
