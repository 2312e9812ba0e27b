//! Request handlers.
//!
//! Each handler extracts a [`RequestContext`], runs the core operation and
//! commits the session back with the response. User-correctable failures
//! become a flash message plus a redirect or a 422 re-render; anything else
//! propagates as an [`AppError`](crate::error::AppError).

pub mod documents;
pub mod users;

use std::sync::Arc;

use axum::response::{Redirect, Response};
use flatcms_core::{CredentialStore, SessionData};
use tracing::warn;

use crate::app::AppState;
use crate::error::AppError;
use crate::session::RequestContext;
use crate::views::PageContext;

/// Take the flash message and sign-in status for rendering a page.
pub(crate) fn page_context(session: &mut SessionData) -> PageContext<'_> {
    let flash = session.take_message();
    PageContext {
        flash,
        username: session.username(),
    }
}

/// Set a flash message and redirect to the document index.
pub(crate) fn redirect_with(
    mut ctx: RequestContext,
    state: &AppState,
    message: impl Into<String>,
) -> Response {
    ctx.session.set_message(message);
    ctx.commit(&state.sessions, Redirect::to("/"))
}

/// Let the request through only when signed in; otherwise produce the
/// redirect the caller should return.
pub(crate) fn require_user(ctx: RequestContext, state: &AppState) -> Result<RequestContext, Response> {
    match ctx.session.require_authenticated().map(|_| ()) {
        Ok(()) => Ok(ctx),
        Err(e) => {
            warn!("Refused request from anonymous session");
            Err(redirect_with(ctx, state, e.to_string()))
        }
    }
}

/// Run a credential operation against the session on the blocking pool.
/// Password hashing is deliberately slow and must not stall the runtime.
pub(crate) async fn with_credentials<T, F>(
    state: &AppState,
    session: &mut SessionData,
    op: F,
) -> Result<T, AppError>
where
    F: FnOnce(&mut SessionData, &CredentialStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let credentials = Arc::clone(&state.credentials);
    let mut owned = std::mem::take(session);
    let (owned, output) = tokio::task::spawn_blocking(move || {
        let output = op(&mut owned, &credentials);
        (owned, output)
    })
    .await?;
    *session = owned;
    Ok(output)
}
