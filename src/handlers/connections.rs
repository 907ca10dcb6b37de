//! # Connection Handlers
//!
//! Form posts for creating, updating, deleting and testing connections.
//! Successful mutations redirect back to the connections view.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::page;
use crate::error::RenderError;
use crate::pages::connections::ConnectionsPage;
use crate::server::AppState;

pub const CONNECTIONS_PATH: &str = "/connections";

/// Body of the delete confirmation form
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteForm {
    fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

pub(crate) fn new_page(state: &AppState) -> ConnectionsPage {
    ConnectionsPage::new(Arc::clone(&state.api))
        .with_callback_url(state.config.frontend_url("/oauth/callback"))
}

pub(crate) async fn load_page(state: &AppState) -> ConnectionsPage {
    let mut connections = new_page(state);
    connections.refresh().await;
    connections
}

pub(crate) fn render(connections: &ConnectionsPage) -> Response {
    connections
        .render()
        .map_err(RenderError::from)
        .and_then(|body| page("Connections", body))
        .into_response()
}

pub async fn list_connections(State(state): State<AppState>) -> Response {
    render(&load_page(&state).await)
}

pub async fn create_connection(
    State(state): State<AppState>,
    Form(posted): Form<HashMap<String, String>>,
) -> Response {
    let mut connections = load_page(&state).await;
    if connections.create(&posted).await {
        return Redirect::to(CONNECTIONS_PATH).into_response();
    }
    render(&connections)
}

pub async fn update_connection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(posted): Form<HashMap<String, String>>,
) -> Response {
    let mut connections = load_page(&state).await;
    if connections.update(id, &posted).await {
        return Redirect::to(CONNECTIONS_PATH).into_response();
    }
    render(&connections)
}

/// Ask the user to confirm a delete
pub async fn confirm_delete(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let mut connections = load_page(&state).await;
    match connections.render_delete_prompt(id) {
        Some(prompt) => prompt
            .map_err(RenderError::from)
            .and_then(|body| page("Delete connection", body))
            .into_response(),
        None => {
            if connections.view().error.is_none() {
                connections.set_notice(format!("Connection {} not found", id));
            }
            render(&connections)
        }
    }
}

pub async fn delete_connection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Response {
    if !form.confirmed() {
        return Redirect::to(CONNECTIONS_PATH).into_response();
    }

    let mut connections = new_page(&state);
    if connections.delete(id, true).await {
        return Redirect::to(CONNECTIONS_PATH).into_response();
    }
    connections.refresh().await;
    render(&connections)
}

/// Run a connection test and show the result above the refreshed list
pub async fn test_connection(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let mut connections = load_page(&state).await;
    connections.test(id).await;
    render(&connections)
}
