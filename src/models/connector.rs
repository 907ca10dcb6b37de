//! Connector model
//!
//! Connectors are registered by the backend and are read-only from the
//! console's point of view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A backend-registered integration type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Numeric identifier assigned by the backend
    #[serde(default)]
    pub id: i64,
    /// Unique connector key (e.g., "github")
    pub key: String,
    /// Display name
    pub name: String,
    /// Whether the connector supports the OAuth authorization-code flow
    #[serde(default)]
    pub supports_oauth: bool,
    /// OAuth scopes requested by the connector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_scopes: Option<Vec<String>>,
    /// Optional configuration schema used to render structured inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<ConfigSchema>,
}

impl Connector {
    /// Declared schema properties, or `None` when the connector has no usable schema.
    pub fn schema_properties(&self) -> Option<&BTreeMap<String, SchemaProperty>> {
        self.config_schema
            .as_ref()
            .map(|schema| &schema.properties)
            .filter(|properties| !properties.is_empty())
    }

    /// First character of the display name, used as the card avatar.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// JSON-Schema-like description of a connector's configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchema {
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,
}

/// Display hints for a single configuration field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaProperty {
    /// Declared type, defaulting to `string`.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("string")
    }
}
