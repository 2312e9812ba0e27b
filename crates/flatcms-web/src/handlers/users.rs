use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use super::{page_context, redirect_with, with_credentials};
use crate::app::AppState;
use crate::error::AppResult;
use crate::session::RequestContext;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsForm {
    fn trimmed(self) -> (String, String) {
        (
            self.username.trim().to_string(),
            self.password.trim().to_string(),
        )
    }
}

pub async fn sign_in_form(State(state): State<AppState>, mut ctx: RequestContext) -> AppResult {
    if ctx.session.is_signed_in() {
        return Ok(ctx.commit(&state.sessions, Redirect::to("/")));
    }
    let html = views::sign_in(&page_context(&mut ctx.session), "");
    Ok(ctx.commit(&state.sessions, Html(html)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<CredentialsForm>,
) -> AppResult {
    let (username, password) = form.trimmed();

    let user = username.clone();
    let outcome = with_credentials(&state, &mut ctx.session, move |session, store| {
        session.sign_in(store, &user, &password)
    })
    .await?;

    match outcome {
        Ok(()) => {
            ctx.rotate(&state.sessions);
            Ok(redirect_with(ctx, &state, "Welcome!"))
        }
        Err(e) if e.is_user_facing() => {
            ctx.session.set_message(e.to_string());
            let html = views::sign_in(&page_context(&mut ctx.session), &username);
            Ok(ctx.commit(
                &state.sessions,
                (StatusCode::UNPROCESSABLE_ENTITY, Html(html)),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn sign_out(State(state): State<AppState>, mut ctx: RequestContext) -> AppResult {
    ctx.session.sign_out();
    Ok(redirect_with(ctx, &state, "You have been signed out."))
}

pub async fn sign_up_form(State(state): State<AppState>, mut ctx: RequestContext) -> AppResult {
    if ctx.session.is_signed_in() {
        return Ok(ctx.commit(&state.sessions, Redirect::to("/")));
    }
    let html = views::sign_up(&page_context(&mut ctx.session), "");
    Ok(ctx.commit(&state.sessions, Html(html)))
}

pub async fn sign_up(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<CredentialsForm>,
) -> AppResult {
    let (username, password) = form.trimmed();

    let user = username.clone();
    let outcome = with_credentials(&state, &mut ctx.session, move |session, store| {
        session.register(store, &user, &password)
    })
    .await?;

    match outcome {
        Ok(()) => {
            ctx.rotate(&state.sessions);
            Ok(redirect_with(
                ctx,
                &state,
                format!("Account for {} has been created.", username),
            ))
        }
        Err(e) if e.is_user_facing() => {
            ctx.session.set_message(e.to_string());
            let html = views::sign_up(&page_context(&mut ctx.session), &username);
            Ok(ctx.commit(
                &state.sessions,
                (StatusCode::UNPROCESSABLE_ENTITY, Html(html)),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
