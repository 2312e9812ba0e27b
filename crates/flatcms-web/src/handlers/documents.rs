use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Form;
use flatcms_core::render::render_markdown;
use flatcms_core::{DocumentKind, DocumentStore, Error};
use serde::Deserialize;
use tracing::debug;

use super::{page_context, redirect_with, require_user};
use crate::app::AppState;
use crate::error::AppResult;
use crate::session::RequestContext;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub new_content: String,
}

pub async fn index(State(state): State<AppState>, mut ctx: RequestContext) -> AppResult {
    let files = state.documents.list()?;
    let html = views::index(&page_context(&mut ctx.session), &files);
    Ok(ctx.commit(&state.sessions, Html(html)))
}

pub async fn new_form(State(state): State<AppState>, ctx: RequestContext) -> AppResult {
    let mut ctx = match require_user(ctx, &state) {
        Ok(ctx) => ctx,
        Err(refused) => return Ok(refused),
    };
    let html = views::new_document(&page_context(&mut ctx.session), "");
    Ok(ctx.commit(&state.sessions, Html(html)))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<CreateForm>,
) -> AppResult {
    let mut ctx = match require_user(ctx, &state) {
        Ok(ctx) => ctx,
        Err(refused) => return Ok(refused),
    };

    match state.documents.create(&form.filename) {
        Ok(()) => Ok(redirect_with(
            ctx,
            &state,
            format!("{} has been created.", form.filename),
        )),
        Err(e) if e.is_user_facing() => {
            debug!(filename = %form.filename, error = %e, "Rejected new document");
            ctx.session.set_message(e.to_string());
            let html = views::new_document(&page_context(&mut ctx.session), &form.filename);
            Ok(ctx.commit(
                &state.sessions,
                (StatusCode::UNPROCESSABLE_ENTITY, Html(html)),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn show(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    ctx: RequestContext,
) -> AppResult {
    show_document(&state, &filename, ctx)
}

/// `GET /create` is shadowed by the create route; answer it like any other
/// document lookup.
pub async fn show_create(State(state): State<AppState>, ctx: RequestContext) -> AppResult {
    show_document(&state, "create", ctx)
}

fn show_document(state: &AppState, filename: &str, mut ctx: RequestContext) -> AppResult {
    let content = match state.documents.read(filename) {
        Ok(content) => content,
        Err(e @ Error::NotFound(_)) => return Ok(redirect_with(ctx, state, e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let response = match DocumentStore::classify(filename) {
        DocumentKind::Markdown => {
            let rendered = render_markdown(&String::from_utf8_lossy(&content));
            let html =
                views::markdown_document(&page_context(&mut ctx.session), filename, &rendered);
            Html(html).into_response()
        }
        kind => ([(CONTENT_TYPE, kind.content_type())], content).into_response(),
    };
    Ok(ctx.commit(&state.sessions, response))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    ctx: RequestContext,
) -> AppResult {
    let mut ctx = match require_user(ctx, &state) {
        Ok(ctx) => ctx,
        Err(refused) => return Ok(refused),
    };

    match state.documents.read(&filename) {
        Ok(content) => {
            let content = String::from_utf8_lossy(&content);
            let html =
                views::edit_document(&page_context(&mut ctx.session), &filename, &content);
            Ok(ctx.commit(&state.sessions, Html(html)))
        }
        Err(e @ Error::NotFound(_)) => Ok(redirect_with(ctx, &state, e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    ctx: RequestContext,
    Form(form): Form<UpdateForm>,
) -> AppResult {
    let ctx = match require_user(ctx, &state) {
        Ok(ctx) => ctx,
        Err(refused) => return Ok(refused),
    };

    match state.documents.update(&filename, form.new_content.as_bytes()) {
        Ok(()) => Ok(redirect_with(
            ctx,
            &state,
            format!("{} has been updated.", filename),
        )),
        Err(e) if e.is_user_facing() => Ok(redirect_with(ctx, &state, e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    ctx: RequestContext,
) -> AppResult {
    let ctx = match require_user(ctx, &state) {
        Ok(ctx) => ctx,
        Err(refused) => return Ok(refused),
    };

    match state.documents.delete(&filename) {
        Ok(()) => Ok(redirect_with(
            ctx,
            &state,
            format!("{} has been deleted.", filename),
        )),
        Err(e @ Error::NotFound(_)) => Ok(redirect_with(ctx, &state, e.to_string())),
        Err(e) => Err(e.into()),
    }
}
