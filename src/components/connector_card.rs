//! Card presenting a connector's basics. The markup is the `connector_card`
//! macro in `partials.html`; callers supply the card's actions.

use serde::Serialize;

use crate::models::Connector;
use crate::pages::connector_segment;

/// Values the card macro displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub initial: String,
    pub name: String,
    pub key: String,
    /// Key percent-encoded as one path segment, for links to the plugin page
    pub segment: String,
    pub supports_oauth: bool,
    pub scopes: Vec<String>,
}

impl From<&Connector> for CardView {
    fn from(connector: &Connector) -> Self {
        Self {
            initial: connector.initial(),
            name: connector.name.clone(),
            key: connector.key.clone(),
            segment: connector_segment(&connector.key),
            supports_oauth: connector.supports_oauth,
            scopes: connector.oauth_scopes.clone().unwrap_or_default(),
        }
    }
}
