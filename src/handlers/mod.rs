//! # HTTP Handlers
//!
//! Console routes. Every page handler renders HTML; upstream failures become
//! on-page messages rather than error statuses.

use axum::{
    extract::{Path, State},
    response::{Html, Json},
};

use crate::error::RenderError;
use crate::models::ServiceInfo;
use crate::pages::connector::ConnectorPage;
use crate::pages::home::HomePage;
use crate::server::AppState;
use crate::templates::{Head, layout};

pub mod connections;
pub mod oauth;

/// Wrap a page body in the shared layout.
pub(crate) fn page(title: &str, body: String) -> Result<Html<String>, RenderError> {
    Ok(Html(layout(title, &Head::default(), body)?))
}

/// Liveness check returning basic service information
pub async fn healthz() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Connector catalogue
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, RenderError> {
    let home = HomePage::load(state.api.as_ref()).await;
    page("Connectors", home.render()?)
}

/// Plugin page for one connector
pub async fn connector_page(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Html<String>, RenderError> {
    let connector = ConnectorPage::load(state.api.as_ref(), &key).await;
    page(&connector.title(), connector.render()?)
}
