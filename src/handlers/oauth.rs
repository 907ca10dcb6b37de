//! # OAuth Handlers
//!
//! Starting an authorization redirects the browser to the provider; the
//! provider later returns to [`callback`].

use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::connections::{new_page, render};
use crate::error::RenderError;
use crate::pages::oauth_callback::{CallbackQuery, OAuthCallback};
use crate::server::AppState;
use crate::templates::layout;

/// Fields read from the form that holds the "Connect OAuth" button
#[derive(Debug, Deserialize)]
pub struct InitiateForm {
    pub connector_key: String,
    #[serde(default)]
    pub connection_id: Option<i64>,
}

/// Request an authorization URL and send the browser there
pub async fn initiate(State(state): State<AppState>, Form(form): Form<InitiateForm>) -> Response {
    let mut connections = new_page(&state);
    match connections
        .initiate_oauth(&form.connector_key, form.connection_id)
        .await
    {
        Some(authorization_url) => Redirect::to(&authorization_url).into_response(),
        None => {
            connections.refresh().await;
            render(&connections)
        }
    }
}

/// Provider redirect target
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, RenderError> {
    let outcome = OAuthCallback::new(query, state.config.oauth_redirect_delay())
        .complete(state.api.as_ref())
        .await;
    let body = outcome.render()?;
    Ok(Html(layout("OAuth Callback", &outcome.head(), body)?))
}
