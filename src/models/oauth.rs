//! OAuth request/response bodies exchanged with the backend

use serde::{Deserialize, Serialize};

/// Response to an OAuth initiation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationUrl {
    /// Provider authorization URL the browser is redirected to
    pub authorization_url: String,
}

/// Body sent to the backend to complete the authorization-code exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthCallbackRequest {
    pub code: String,
    /// The state exactly as received from the provider redirect
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<i64>,
}

/// Outcome reported by the backend for a completed callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthCallbackResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
