//! Connection model
//!
//! A connection is a configured instance of a connector. The backend owns it;
//! the console only ever holds the snapshot returned by the latest fetch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::connector::Connector;

/// Lifecycle status reported by the backend for a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionStatus {
    Active,
    Inactive,
    Pending,
    Error,
    /// Any value outside the known set, kept verbatim
    Unrecognized(String),
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionStatus::Active => "active",
            ConnectionStatus::Inactive => "inactive",
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Error => "error",
            ConnectionStatus::Unrecognized(value) => value,
        }
    }
}

impl From<String> for ConnectionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => ConnectionStatus::Active,
            "inactive" => ConnectionStatus::Inactive,
            "pending" => ConnectionStatus::Pending,
            "error" => ConnectionStatus::Error,
            _ => ConnectionStatus::Unrecognized(value),
        }
    }
}

impl From<ConnectionStatus> for String {
    fn from(status: ConnectionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Connection as returned by the backend, with its connector embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub connector: Connector,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub has_oauth_token: bool,
    #[serde(default)]
    pub config_data: Option<Map<String, Value>>,
}

impl Connection {
    /// Configuration snapshot, empty when the backend returned none.
    pub fn config(&self) -> Map<String, Value> {
        self.config_data.clone().unwrap_or_default()
    }
}

/// Create-connection request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionCreate {
    pub connector_key: String,
    #[serde(default)]
    pub config_data: Option<Map<String, Value>>,
}

/// Update-connection request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    #[serde(default)]
    pub config_data: Option<Map<String, Value>>,
}
