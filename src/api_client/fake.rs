//! In-memory [`ConnectorApi`] used by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::ConnectorApi;
use crate::error::ClientError;
use crate::models::{
    AuthorizationUrl, Connection, ConnectionCreate, ConnectionStatus, ConnectionUpdate, Connector,
    OAuthCallbackRequest, OAuthCallbackResponse,
};

/// A call observed by [`FakeApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListConnectors,
    GetConnector(String),
    ListConnections,
    Create(ConnectionCreate),
    Update(i64, ConnectionUpdate),
    Delete(i64),
    Test(i64),
    InitiateOAuth(String, Option<i64>),
    CompleteOAuth(String, OAuthCallbackRequest),
}

#[derive(Default)]
pub struct FakeApi {
    pub connectors: Mutex<Vec<Connector>>,
    pub connections: Mutex<Vec<Connection>>,
    pub calls: Mutex<Vec<Call>>,
    /// When set, every call fails with this message as a 500
    pub fail_with: Mutex<Option<String>>,
    pub callback_response: Mutex<Option<OAuthCallbackResponse>>,
}

impl FakeApi {
    pub fn with_data(connectors: Vec<Connector>, connections: Vec<Connection>) -> Self {
        let api = Self::default();
        *api.connectors.lock().unwrap() = connectors;
        *api.connections.lock().unwrap() = connections;
        api
    }

    pub fn failing(message: &str) -> Self {
        let api = Self::default();
        *api.fail_with.lock().unwrap() = Some(message.to_string());
        api
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(ClientError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn connector(&self, key: &str) -> Result<Connector, ClientError> {
        self.connectors
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.key == key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("Connector '{}'", key),
            })
    }
}

#[async_trait]
impl ConnectorApi for FakeApi {
    async fn list_connectors(&self) -> Result<Vec<Connector>, ClientError> {
        self.record(Call::ListConnectors)?;
        Ok(self.connectors.lock().unwrap().clone())
    }

    async fn get_connector(&self, key: &str) -> Result<Connector, ClientError> {
        self.record(Call::GetConnector(key.to_string()))?;
        self.connector(key)
    }

    async fn list_connections(&self) -> Result<Vec<Connection>, ClientError> {
        self.record(Call::ListConnections)?;
        Ok(self.connections.lock().unwrap().clone())
    }

    async fn create_connection(&self, body: &ConnectionCreate) -> Result<Connection, ClientError> {
        self.record(Call::Create(body.clone()))?;
        let connector = self.connector(&body.connector_key)?;
        let mut connections = self.connections.lock().unwrap();
        let connection = Connection {
            id: connections.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            connector,
            status: ConnectionStatus::Pending,
            has_oauth_token: false,
            config_data: body.config_data.clone(),
        };
        connections.push(connection.clone());
        Ok(connection)
    }

    async fn update_connection(
        &self,
        id: i64,
        body: &ConnectionUpdate,
    ) -> Result<Connection, ClientError> {
        self.record(Call::Update(id, body.clone()))?;
        let mut connections = self.connections.lock().unwrap();
        let connection = connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("Connection {}", id),
            })?;
        connection.config_data = body.config_data.clone();
        Ok(connection.clone())
    }

    async fn delete_connection(&self, id: i64) -> Result<(), ClientError> {
        self.record(Call::Delete(id))?;
        self.connections.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn test_connection(&self, id: i64) -> Result<Value, ClientError> {
        self.record(Call::Test(id))?;
        Ok(json!({"ok": true, "connection_id": id}))
    }

    async fn initiate_oauth(
        &self,
        connector_key: &str,
        connection_id: Option<i64>,
    ) -> Result<AuthorizationUrl, ClientError> {
        self.record(Call::InitiateOAuth(connector_key.to_string(), connection_id))?;
        Ok(AuthorizationUrl {
            authorization_url: format!(
                "https://provider.example.com/authorize?connector={}",
                connector_key
            ),
        })
    }

    async fn complete_oauth_callback(
        &self,
        connector_key: &str,
        request: &OAuthCallbackRequest,
    ) -> Result<OAuthCallbackResponse, ClientError> {
        self.record(Call::CompleteOAuth(connector_key.to_string(), request.clone()))?;
        Ok(self
            .callback_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(OAuthCallbackResponse {
                success: true,
                message: None,
            }))
    }
}

pub fn connector(key: &str, name: &str, supports_oauth: bool) -> Connector {
    Connector {
        id: 1,
        key: key.to_string(),
        name: name.to_string(),
        supports_oauth,
        oauth_scopes: None,
        config_schema: None,
    }
}

pub fn connection(id: i64, connector: Connector, config: Value) -> Connection {
    Connection {
        id,
        connector,
        status: ConnectionStatus::Active,
        has_oauth_token: false,
        config_data: config.as_object().cloned(),
    }
}
