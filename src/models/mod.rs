//! # Data Models
//!
//! Wire types exchanged with the connector backend API, plus the service
//! information served by the console's health endpoint.

use serde::{Deserialize, Serialize};

pub mod connection;
pub mod connector;
pub mod oauth;

pub use connection::{Connection, ConnectionCreate, ConnectionStatus, ConnectionUpdate};
pub use connector::{ConfigSchema, Connector, SchemaProperty};
pub use oauth::{AuthorizationUrl, OAuthCallbackRequest, OAuthCallbackResponse};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "connector-console".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
