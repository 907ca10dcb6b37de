//! # Error Handling
//!
//! Errors raised while talking to the connector backend. Every variant renders
//! to a human-readable message that pages show in place of the failed content.
//! A page that cannot be rendered at all becomes a [`RenderError`] response.

use axum::response::{Html, IntoResponse, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

/// Failure of a backend API call
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (DNS, connect, TLS, body read)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The requested resource does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The backend answered 2xx but the body did not match the expected shape
    #[error("Unexpected response from backend: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request URL could not be built from the configured base
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Message shown to the user in place of the failed content.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// HTTP status reported by the backend, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::NotFound { .. } => Some(StatusCode::NOT_FOUND.as_u16()),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            ClientError::Decode(_) | ClientError::Url(_) => None,
        }
    }
}

/// A page template failed to render
#[derive(Debug, Error)]
#[error("failed to render page: {0}")]
pub struct RenderError(#[from] pub minijinja::Error);

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Template rendering failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<!DOCTYPE html><title>Error</title><p>The page could not be rendered.</p>"),
        )
            .into_response()
    }
}

/// Error envelope shapes the backend is known to return.
///
/// Problem-style bodies carry `message`; framework-generated ones carry `detail`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Build an [`ClientError::Api`] from a non-success status and its raw body.
pub fn api_error(status: StatusCode, body: &str) -> ClientError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let detail = match parsed.detail {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    let message = detail
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
