//! Configuration loading for the Connector Console.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `POBLYSH_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Upper bound for the post-OAuth redirect delay.
const MAX_OAUTH_REDIRECT_DELAY_MS: u64 = 60_000;

/// Application configuration derived from `POBLYSH_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_console_bind_addr")]
    pub console_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Base URL of the connector backend API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Bearer token sent to the backend on every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Externally reachable URL of this console, used to show the OAuth redirect target
    #[serde(default = "default_public_url")]
    pub public_url: String,
    #[serde(default = "default_oauth_redirect_delay_ms")]
    pub oauth_redirect_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            console_bind_addr: default_console_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            api_base_url: default_api_base_url(),
            api_token: None,
            public_url: default_public_url(),
            oauth_redirect_delay_ms: default_oauth_redirect_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.console_bind_addr.parse()
    }

    /// Delay between a successful OAuth callback and the redirect to the connections view.
    pub fn oauth_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.oauth_redirect_delay_ms)
    }

    /// Absolute URL of a console path, e.g. `frontend_url("/oauth/callback")`.
    pub fn frontend_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.api_token.is_some() {
            config.api_token = Some("[REDACTED]".to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(source) = self.bind_addr() {
            return Err(ConfigError::InvalidBindAddr {
                value: self.console_bind_addr.clone(),
                source,
            });
        }

        validate_http_url("API_BASE_URL", &self.api_base_url)?;
        validate_http_url("PUBLIC_URL", &self.public_url)?;

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        if self.oauth_redirect_delay_ms > MAX_OAUTH_REDIRECT_DELAY_MS {
            return Err(ConfigError::InvalidOAuthRedirectDelay {
                value: self.oauth_redirect_delay_ms,
            });
        }

        Ok(())
    }
}

fn validate_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: source.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(())
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_console_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_oauth_redirect_delay_ms() -> u64 {
    2000
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid console bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid {field} '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("OAuth redirect delay must not exceed 60000 ms, got {value}")]
    InvalidOAuthRedirectDelay { value: u64 },
    #[error("invalid value for {key}: '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

/// Loads configuration using layered `.env` files and `POBLYSH_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.{profile}`, `.env.{profile}.local`, then the
    /// process environment, later layers winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("POBLYSH_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_non_empty(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let console_bind_addr = take_non_empty(&mut layered, "CONSOLE_BIND_ADDR")
            .unwrap_or_else(default_console_bind_addr);
        let log_level =
            take_non_empty(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_non_empty(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let api_base_url =
            take_non_empty(&mut layered, "API_BASE_URL").unwrap_or_else(default_api_base_url);
        let api_token = take_non_empty(&mut layered, "API_TOKEN").map(|t| t.trim().to_string());
        let public_url =
            take_non_empty(&mut layered, "PUBLIC_URL").unwrap_or_else(default_public_url);

        let oauth_redirect_delay_ms = match take_non_empty(&mut layered, "OAUTH_REDIRECT_DELAY_MS")
        {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "POBLYSH_OAUTH_REDIRECT_DELAY_MS",
                    value,
                })?,
            None => default_oauth_redirect_delay_ms(),
        };

        let config = AppConfig {
            profile,
            console_bind_addr,
            log_level,
            log_format,
            api_base_url,
            api_token,
            public_url,
            oauth_redirect_delay_ms,
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("POBLYSH_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("POBLYSH_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_non_empty(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values.remove(key).filter(|v| !v.trim().is_empty())
}
