//! # Connections Page
//!
//! Orchestrates the connections view: loads connectors and connections, renders
//! one form per existing connection and one per connector, and runs the
//! create/update/delete/test/OAuth actions through the [`ConnectorApi`].
//!
//! Successful mutations are followed by a redirect to `GET /connections`, so
//! the next render always starts from a full re-fetch.

use std::collections::HashMap;
use std::sync::Arc;

use minijinja::{Error, Value, context};
use tracing::{info, warn};

use crate::api_client::ConnectorApi;
use crate::components::connection_form::{ConnectionForm, FormMode};
use crate::components::connector_card::CardView;
use crate::components::status_badge;
use crate::error::ClientError;
use crate::models::{Connection, Connector};
use crate::pages::OAUTH_INITIATE_PATH;
use crate::templates::{fragment, render_template};

/// Explicit view state of the connections page
#[derive(Debug, Clone, Default)]
pub struct ConnectionsView {
    pub connectors: Vec<Connector>,
    pub connections: Vec<Connection>,
    pub loading: bool,
    pub error: Option<String>,
    /// Transient message: test results, failed deletes, failed OAuth initiation
    pub notice: Option<String>,
}

pub struct ConnectionsPage {
    api: Arc<dyn ConnectorApi>,
    view: ConnectionsView,
    /// Form whose submission was rejected, re-rendered with the user's input
    rejected: Option<ConnectionForm>,
    /// Where providers send the browser after authorization
    callback_url: Option<String>,
}

impl ConnectionsPage {
    pub fn new(api: Arc<dyn ConnectorApi>) -> Self {
        Self {
            api,
            view: ConnectionsView {
                loading: true,
                ..Default::default()
            },
            rejected: None,
            callback_url: None,
        }
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Create the page and perform the initial fetch.
    pub async fn load(api: Arc<dyn ConnectorApi>) -> Self {
        let mut page = Self::new(api);
        page.refresh().await;
        page
    }

    pub fn view(&self) -> &ConnectionsView {
        &self.view
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.view.notice = Some(message.into());
    }

    /// Fetch connectors and connections concurrently.
    pub async fn refresh(&mut self) {
        self.view.error = None;
        self.view.loading = true;

        let result = tokio::try_join!(self.api.list_connectors(), self.api.list_connections());
        match result {
            Ok((connectors, connections)) => {
                self.view.connectors = connectors;
                self.view.connections = connections;
            }
            Err(err) => {
                warn!(status = ?err.status(), error = %err, "Failed to load connections view");
                self.view.error = Some(err.user_message());
            }
        }

        self.view.loading = false;
    }

    fn connection(&self, id: i64) -> Option<&Connection> {
        self.view.connections.iter().find(|c| c.id == id)
    }

    /// Create a connection from a posted form. Returns whether the backend accepted it.
    pub async fn create(&mut self, posted: &HashMap<String, String>) -> bool {
        let key = posted
            .get("connector_key")
            .map(String::as_str)
            .unwrap_or_default();
        let Some(connector) = self.view.connectors.iter().find(|c| c.key == key) else {
            // A failed refresh already explains why the connector is missing.
            if self.view.error.is_none() {
                self.set_notice(format!("Unknown connector '{}'", key));
            }
            return false;
        };

        let mut form = ConnectionForm::new(connector, &Default::default(), FormMode::Create)
            .with_oauth_action(OAUTH_INITIATE_PATH);
        form.apply_form(posted);

        let api = Arc::clone(&self.api);
        let created = form
            .submit(move |submission| async move {
                let connection = api.create_connection(&submission.into_create()).await?;
                info!(connection_id = connection.id, "Connection created");
                Ok::<_, ClientError>(())
            })
            .await;

        if !created {
            self.rejected = Some(form);
        }
        created
    }

    /// Update an existing connection's config from a posted form.
    pub async fn update(&mut self, id: i64, posted: &HashMap<String, String>) -> bool {
        let Some(connection) = self.connection(id) else {
            self.set_notice(format!("Connection {} not found", id));
            return false;
        };

        let mut form = ConnectionForm::new(
            &connection.connector,
            &connection.config(),
            FormMode::Update { connection_id: id },
        )
        .with_submit_label("Update")
        .with_oauth_action(OAUTH_INITIATE_PATH);
        form.apply_form(posted);

        let api = Arc::clone(&self.api);
        let updated = form
            .submit(move |submission| async move {
                api.update_connection(id, &submission.into_update())
                    .await
                    .map(|_| ())
            })
            .await;

        if !updated {
            self.rejected = Some(form);
        }
        updated
    }

    /// Confirmation question for deleting a connection.
    pub fn delete_prompt(&self, id: i64) -> Option<String> {
        self.connection(id).map(|connection| {
            format!(
                "Delete connection {} for {}?",
                connection.id, connection.connector.name
            )
        })
    }

    /// Delete a connection. Without confirmation nothing is sent to the backend.
    pub async fn delete(&mut self, id: i64, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }

        match self.api.delete_connection(id).await {
            Ok(()) => {
                info!(connection_id = id, "Connection deleted");
                true
            }
            Err(err) => {
                warn!(
                    connection_id = id,
                    status = ?err.status(),
                    error = %err,
                    "Failed to delete connection"
                );
                self.set_notice(format!("Delete failed: {}", err.user_message()));
                false
            }
        }
    }

    /// Exercise a connection and report the result as a notice. List state is untouched.
    pub async fn test(&mut self, id: i64) {
        let message = match self.api.test_connection(id).await {
            Ok(result) => format!(
                "Test succeeded: {}",
                serde_json::to_string(&result).unwrap_or_default()
            ),
            Err(err) => {
                warn!(
                    connection_id = id,
                    status = ?err.status(),
                    error = %err,
                    "Connection test failed"
                );
                format!("Test failed: {}", err.user_message())
            }
        };
        self.set_notice(message);
    }

    /// Request an authorization URL. On failure the reason becomes the page notice.
    pub async fn initiate_oauth(
        &mut self,
        connector_key: &str,
        connection_id: Option<i64>,
    ) -> Option<String> {
        match self.api.initiate_oauth(connector_key, connection_id).await {
            Ok(response) => Some(response.authorization_url),
            Err(err) => {
                warn!(
                    connector_key,
                    ?connection_id,
                    status = ?err.status(),
                    error = %err,
                    "Failed to start OAuth"
                );
                self.set_notice(format!("OAuth initiation failed: {}", err.user_message()));
                None
            }
        }
    }

    fn connection_form(&self, connection: &Connection) -> Result<String, Error> {
        if let Some(form) = &self.rejected
            && form.mode()
                == (FormMode::Update {
                    connection_id: connection.id,
                })
        {
            return form.render();
        }

        ConnectionForm::new(
            &connection.connector,
            &connection.config(),
            FormMode::Update {
                connection_id: connection.id,
            },
        )
        .with_submit_label("Update")
        .with_oauth_action(OAUTH_INITIATE_PATH)
        .render()
    }

    fn create_form(&self, connector: &Connector) -> Result<String, Error> {
        if let Some(form) = &self.rejected
            && form.mode() == FormMode::Create
            && form.connector().key == connector.key
        {
            return form.render();
        }

        ConnectionForm::new(connector, &Default::default(), FormMode::Create)
            .with_submit_label("Create")
            .with_oauth_action(OAUTH_INITIATE_PATH)
            .render()
    }

    /// Render the page body.
    pub fn render(&self) -> Result<String, Error> {
        let connections = self
            .view
            .connections
            .iter()
            .map(|connection| -> Result<Value, Error> {
                let oauth = if connection.has_oauth_token {
                    Some("linked")
                } else if connection.connector.supports_oauth {
                    Some("missing")
                } else {
                    None
                };
                Ok(context! {
                    id => connection.id,
                    name => &connection.connector.name,
                    badge => fragment(status_badge::render(&connection.status)?),
                    oauth => oauth,
                    form => fragment(self.connection_form(connection)?),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let available = self
            .view
            .connectors
            .iter()
            .map(|connector| -> Result<Value, Error> {
                Ok(context! {
                    card => CardView::from(connector),
                    form => fragment(self.create_form(connector)?),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let callback_url = self
            .callback_url
            .as_deref()
            .filter(|_| self.view.connectors.iter().any(|c| c.supports_oauth));

        render_template(
            "connections.html",
            context! {
                callback_url => callback_url,
                banner => &self.view.notice,
                loading => self.view.loading,
                error => &self.view.error,
                connections => connections,
                available => available,
            },
        )
    }

    /// Render the delete confirmation body, or `None` for an unknown connection.
    pub fn render_delete_prompt(&self, id: i64) -> Option<Result<String, Error>> {
        let prompt = self.delete_prompt(id)?;
        Some(render_template(
            "delete_prompt.html",
            context! { prompt => prompt, id => id },
        ))
    }
}
