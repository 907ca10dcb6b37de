//! Plugin page for a single connector.

use minijinja::{Error, context};
use tracing::warn;

use crate::api_client::ConnectorApi;
use crate::components::plugin_screen;
use crate::models::Connector;
use crate::templates::{fragment, render_template};

pub struct ConnectorPage {
    connector: Option<Connector>,
}

impl ConnectorPage {
    /// Fetch one connector. Unknown keys and backend failures both leave the page empty.
    pub async fn load(api: &dyn ConnectorApi, key: &str) -> Self {
        if key.is_empty() {
            return Self { connector: None };
        }

        let connector = match api.get_connector(key).await {
            Ok(connector) => Some(connector),
            Err(err) => {
                warn!(connector_key = key, error = %err, "Failed to load connector");
                None
            }
        };
        Self { connector }
    }

    pub fn connector(&self) -> Option<&Connector> {
        self.connector.as_ref()
    }

    pub fn title(&self) -> String {
        self.connector
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Connector".to_string())
    }

    pub fn render(&self) -> Result<String, Error> {
        let screen = match &self.connector {
            Some(connector) => {
                let details =
                    render_template("connector_details.html", context! { connector => connector })?;
                let screen = plugin_screen::render(
                    &format!("{} Plugin", connector.name),
                    Some("Example plugin area. Replace with connector-specific UI."),
                    Some(details),
                )?;
                Some(fragment(screen))
            }
            None => None,
        };

        render_template(
            "connector.html",
            context! {
                title => self.title(),
                connector => &self.connector,
                screen => screen,
            },
        )
    }
}
