//! # OAuth Callback
//!
//! Landing page for the provider redirect. Reads the query, decodes the state,
//! asks the backend to finish the exchange, and reports the outcome. A
//! successful callback navigates to the connections view after a short delay.

use std::time::Duration;

use minijinja::{Error, context};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api_client::ConnectorApi;
use crate::models::OAuthCallbackRequest;
use crate::oauth_state::decode_state;
use crate::templates::{Head, render_template};

pub const REDIRECT_TARGET: &str = "/connections";

const MISSING_PARAMETERS: &str = "Missing required OAuth parameters (code or state)";
const INVALID_STATE: &str = "Invalid OAuth state parameter";
const DEFAULT_SUCCESS: &str = "OAuth connection successful!";
const DEFAULT_FAILURE: &str = "OAuth connection failed";
const UNEXPECTED: &str = "An unexpected error occurred";

/// Query parameters a provider appends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    Processing,
    Success,
    Error,
}

impl CallbackStatus {
    fn css_class(self) -> &'static str {
        match self {
            CallbackStatus::Processing => "status-processing",
            CallbackStatus::Success => "status-success",
            CallbackStatus::Error => "status-error",
        }
    }
}

/// Settled result of a callback
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Success {
        message: String,
        redirect_to: &'static str,
        after: Duration,
    },
    Error {
        message: String,
    },
}

impl CallbackOutcome {
    fn error(message: impl Into<String>) -> Self {
        CallbackOutcome::Error {
            message: message.into(),
        }
    }

    pub fn status(&self) -> CallbackStatus {
        match self {
            CallbackOutcome::Success { .. } => CallbackStatus::Success,
            CallbackOutcome::Error { .. } => CallbackStatus::Error,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CallbackOutcome::Success { message, .. } | CallbackOutcome::Error { message } => {
                message
            }
        }
    }

    /// Document head carrying the delayed navigation for a successful callback.
    pub fn head(&self) -> Head {
        match self {
            CallbackOutcome::Success {
                redirect_to, after, ..
            } => Head {
                refresh: Some((whole_seconds(*after), (*redirect_to).to_string())),
            },
            CallbackOutcome::Error { .. } => Head::default(),
        }
    }

    pub fn render(&self) -> Result<String, Error> {
        let redirect_to = match self {
            CallbackOutcome::Success { redirect_to, .. } => Some(*redirect_to),
            CallbackOutcome::Error { .. } => None,
        };

        render_template(
            "oauth_callback.html",
            context! {
                status_class => self.status().css_class(),
                message => self.message(),
                redirect_to => redirect_to,
            },
        )
    }
}

/// Meta refresh only takes whole seconds; round up so the delay is never shortened.
fn whole_seconds(delay: Duration) -> u64 {
    let millis = delay.as_millis() as u64;
    millis.div_ceil(1000)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A callback that has not been processed yet. Consumed by [`complete`](Self::complete).
#[derive(Debug)]
pub struct OAuthCallback {
    query: CallbackQuery,
    redirect_delay: Duration,
}

impl OAuthCallback {
    pub fn new(query: CallbackQuery, redirect_delay: Duration) -> Self {
        Self {
            query,
            redirect_delay,
        }
    }

    pub fn status(&self) -> CallbackStatus {
        CallbackStatus::Processing
    }

    /// Validate the redirect, then finish the exchange with the backend.
    pub async fn complete(self, api: &dyn ConnectorApi) -> CallbackOutcome {
        let CallbackQuery {
            code,
            state,
            error,
            error_description,
        } = self.query;

        if let Some(error) = non_empty(error) {
            warn!(provider_error = %error, "Provider returned an OAuth error");
            return CallbackOutcome::error(
                non_empty(error_description).unwrap_or_else(|| format!("OAuth error: {}", error)),
            );
        }

        let (Some(code), Some(state)) = (non_empty(code), non_empty(state)) else {
            warn!("OAuth callback is missing code or state");
            return CallbackOutcome::error(MISSING_PARAMETERS);
        };

        let decoded = match decode_state(&state) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(cause = err.kind(), error = %err, "Rejected OAuth state");
                return CallbackOutcome::error(INVALID_STATE);
            }
        };

        let request = OAuthCallbackRequest {
            code,
            state,
            connection_id: decoded.connection_id,
        };

        match api
            .complete_oauth_callback(&decoded.connector_key, &request)
            .await
        {
            Ok(response) if response.success => {
                info!(
                    connector_key = %decoded.connector_key,
                    connection_id = ?decoded.connection_id,
                    "OAuth callback completed"
                );
                CallbackOutcome::Success {
                    message: non_empty(response.message)
                        .unwrap_or_else(|| DEFAULT_SUCCESS.to_string()),
                    redirect_to: REDIRECT_TARGET,
                    after: self.redirect_delay,
                }
            }
            Ok(response) => {
                warn!(connector_key = %decoded.connector_key, "Backend rejected OAuth callback");
                CallbackOutcome::error(
                    non_empty(response.message).unwrap_or_else(|| DEFAULT_FAILURE.to_string()),
                )
            }
            Err(err) => {
                warn!(
                    connector_key = %decoded.connector_key,
                    status = ?err.status(),
                    error = %err,
                    "OAuth callback request failed"
                );
                let message = err.user_message();
                CallbackOutcome::error(if message.is_empty() {
                    UNEXPECTED.to_string()
                } else {
                    message
                })
            }
        }
    }
}
