//! Shared application state and routing.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use flatcms_core::{Config, CredentialStore, DocumentStore};
use tracing::info;

use crate::handlers::{documents, users};
use crate::session::SessionStore;

/// Shared application state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub documents: Arc<DocumentStore>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(credentials: CredentialStore, documents: DocumentStore, idle_minutes: i64) -> Self {
        Self {
            credentials: Arc::new(credentials),
            documents: Arc::new(documents),
            sessions: SessionStore::new(idle_minutes),
        }
    }

    /// Open (and create if missing) the stores named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let documents_dir = config.documents_dir()?;
        let documents = DocumentStore::new(documents_dir.clone()).with_context(|| {
            format!("Failed to open document directory: {}", documents_dir.display())
        })?;

        let credentials_path = config.credentials_file()?;
        let credentials = CredentialStore::init(credentials_path.clone(), config.hash_cost)
            .with_context(|| {
                format!("Failed to open credential store: {}", credentials_path.display())
            })?;

        info!(
            documents = %documents_dir.display(),
            credentials = %credentials_path.display(),
            "Opened stores"
        );
        Ok(Self::new(credentials, documents, config.session_idle_minutes))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(documents::index))
        .route("/new", get(documents::new_form))
        .route("/create", get(documents::show_create).post(documents::create))
        .route("/users/signin", get(users::sign_in_form).post(users::sign_in))
        .route("/users/signout", post(users::sign_out))
        .route("/users/new", get(users::sign_up_form))
        .route("/users/create", post(users::sign_up))
        .route("/{filename}", get(documents::show).post(documents::update))
        .route("/{filename}/edit", get(documents::edit_form))
        .route("/{filename}/delete", post(documents::delete))
        .with_state(state)
}
