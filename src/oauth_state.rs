//! # OAuth State Decoding
//!
//! The backend round-trips an opaque `state` value through the provider. It is
//! base64-encoded JSON carrying the connector key and, when re-authorizing an
//! existing connection, its id. The console only decodes it; integrity checks
//! belong to the backend.

use base64::Engine;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use serde::Deserialize;
use thiserror::Error;

/// States longer than this are rejected before decoding.
const MAX_STATE_LEN: usize = 4096;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&base64::alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&base64::alphabet::URL_SAFE, LENIENT);

/// Context recovered from the OAuth `state` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub connector_key: String,
    pub connection_id: Option<i64>,
}

#[derive(Debug, Error)]
pub enum OAuthStateError {
    #[error("state is too long ({0} bytes)")]
    TooLong(usize),
    #[error("state is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("state is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("state is not a valid JSON object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state does not name a connector")]
    MissingConnectorKey,
}

impl OAuthStateError {
    /// Short cause tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OAuthStateError::TooLong(_) => "too_long",
            OAuthStateError::Base64(_) => "base64",
            OAuthStateError::Utf8(_) => "utf8",
            OAuthStateError::Json(_) => "json",
            OAuthStateError::MissingConnectorKey => "missing_connector_key",
        }
    }
}

#[derive(Deserialize)]
struct EncodedState {
    #[serde(default)]
    connector_key: Option<String>,
    #[serde(default)]
    connection_id: Option<i64>,
}

/// Decode a `state` parameter. Padding is optional and either base64 alphabet is accepted.
pub fn decode_state(state: &str) -> Result<OAuthState, OAuthStateError> {
    let state = state.trim();
    if state.len() > MAX_STATE_LEN {
        return Err(OAuthStateError::TooLong(state.len()));
    }

    let bytes = match STANDARD_LENIENT.decode(state) {
        Ok(bytes) => bytes,
        Err(err) => URL_SAFE_LENIENT.decode(state).map_err(|_| err)?,
    };
    let json = String::from_utf8(bytes)?;
    let decoded: EncodedState = serde_json::from_str(&json)?;

    let connector_key = decoded
        .connector_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(OAuthStateError::MissingConnectorKey)?;

    Ok(OAuthState {
        connector_key,
        connection_id: decoded.connection_id,
    })
}
