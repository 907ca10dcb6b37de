//! Connector catalogue.

use minijinja::{Error, context};
use tracing::warn;

use crate::api_client::ConnectorApi;
use crate::components::connector_card::CardView;
use crate::models::Connector;
use crate::templates::render_template;

pub struct HomePage {
    connectors: Vec<Connector>,
}

impl HomePage {
    /// Fetch the catalogue. A failed fetch renders as an empty catalogue.
    pub async fn load(api: &dyn ConnectorApi) -> Self {
        let connectors = api.list_connectors().await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load connector catalogue");
            Vec::new()
        });
        Self { connectors }
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn render(&self) -> Result<String, Error> {
        let cards: Vec<CardView> = self.connectors.iter().map(CardView::from).collect();
        render_template("home.html", context! { cards => cards })
    }
}
