//! flatcms core: credential store, document store and the auth gate.
//!
//! The web front end in `flatcms-web` is thin glue over these types.

pub mod auth;
pub mod config;
pub mod documents;
pub mod error;
mod fsio;
pub mod render;
pub mod utils;

pub use auth::{AuthState, CredentialStore, SessionData, UserRecord};
pub use config::{Config, HashCost};
pub use documents::{DocumentKind, DocumentStore};
pub use error::{Error, Result};
