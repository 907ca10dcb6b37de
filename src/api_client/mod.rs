//! # Backend API Client
//!
//! The console performs no data operation itself; everything goes through the
//! [`ConnectorApi`] trait. [`HttpApiClient`] is the production implementation
//! over `reqwest`.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::AppConfig;
use crate::error::{ClientError, api_error};
use crate::models::{
    AuthorizationUrl, Connection, ConnectionCreate, ConnectionUpdate, Connector,
    OAuthCallbackRequest, OAuthCallbackResponse,
};

#[cfg(test)]
pub(crate) mod fake;

const USER_AGENT: &str = concat!("connector-console/", env!("CARGO_PKG_VERSION"));

/// Operations the console consumes from the connector backend
#[async_trait]
pub trait ConnectorApi: Send + Sync {
    /// List every connector registered with the backend
    async fn list_connectors(&self) -> Result<Vec<Connector>, ClientError>;

    /// Fetch a single connector; [`ClientError::NotFound`] when the key is unknown
    async fn get_connector(&self, key: &str) -> Result<Connector, ClientError>;

    /// List every connection
    async fn list_connections(&self) -> Result<Vec<Connection>, ClientError>;

    async fn create_connection(&self, body: &ConnectionCreate) -> Result<Connection, ClientError>;

    async fn update_connection(
        &self,
        id: i64,
        body: &ConnectionUpdate,
    ) -> Result<Connection, ClientError>;

    async fn delete_connection(&self, id: i64) -> Result<(), ClientError>;

    /// Ask the backend to exercise a connection. The result shape is backend-defined.
    async fn test_connection(&self, id: i64) -> Result<Value, ClientError>;

    /// Request a provider authorization URL for a new or existing connection
    async fn initiate_oauth(
        &self,
        connector_key: &str,
        connection_id: Option<i64>,
    ) -> Result<AuthorizationUrl, ClientError>;

    /// Hand the provider's authorization code to the backend to finish the exchange
    async fn complete_oauth_callback(
        &self,
        connector_key: &str,
        request: &OAuthCallbackRequest,
    ) -> Result<OAuthCallbackResponse, ClientError>;
}

/// `reqwest`-backed [`ConnectorApi`] rooted at the backend base URL
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpApiClient {
    /// Create a client for the backend at `base_url`, optionally sending a bearer token.
    pub fn new(base_url: Url, api_token: Option<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url,
            api_token: api_token.filter(|token| !token.is_empty()),
        })
    }

    /// Create a client from the console configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_base_url)?;
        Self::new(base_url, config.api_token.clone())
    }

    /// Build `{base}/api/v1/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok((status, body))
        } else {
            tracing::debug!(status = status.as_u16(), "Backend returned error status");
            Err(api_error(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let (_, body) = self.send(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ConnectorApi for HttpApiClient {
    #[tracing::instrument(skip(self), err(Display))]
    async fn list_connectors(&self) -> Result<Vec<Connector>, ClientError> {
        let url = self.endpoint(&["connectors"])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    #[tracing::instrument(skip(self), err(Display))]
    async fn get_connector(&self, key: &str) -> Result<Connector, ClientError> {
        let url = self.endpoint(&["connectors", key])?;
        match self.send_json(self.request(Method::GET, url)).await {
            Err(ClientError::Api { status: 404, .. }) => Err(ClientError::NotFound {
                resource: format!("Connector '{}'", key),
            }),
            other => other,
        }
    }

    #[tracing::instrument(skip(self), err(Display))]
    async fn list_connections(&self) -> Result<Vec<Connection>, ClientError> {
        let url = self.endpoint(&["connections"])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    #[tracing::instrument(skip(self, body), fields(connector_key = %body.connector_key), err(Display))]
    async fn create_connection(&self, body: &ConnectionCreate) -> Result<Connection, ClientError> {
        let url = self.endpoint(&["connections"])?;
        self.send_json(self.request(Method::POST, url).json(body))
            .await
    }

    #[tracing::instrument(skip(self, body), err(Display))]
    async fn update_connection(
        &self,
        id: i64,
        body: &ConnectionUpdate,
    ) -> Result<Connection, ClientError> {
        let id = id.to_string();
        let url = self.endpoint(&["connections", &id])?;
        self.send_json(self.request(Method::PUT, url).json(body))
            .await
    }

    #[tracing::instrument(skip(self), err(Display))]
    async fn delete_connection(&self, id: i64) -> Result<(), ClientError> {
        let id = id.to_string();
        let url = self.endpoint(&["connections", &id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), err(Display))]
    async fn test_connection(&self, id: i64) -> Result<Value, ClientError> {
        let id = id.to_string();
        let url = self.endpoint(&["connections", &id, "test"])?;
        let (_, body) = self.send(self.request(Method::POST, url)).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    #[tracing::instrument(skip(self), err(Display))]
    async fn initiate_oauth(
        &self,
        connector_key: &str,
        connection_id: Option<i64>,
    ) -> Result<AuthorizationUrl, ClientError> {
        let mut url = self.endpoint(&["oauth", connector_key, "authorize"])?;
        if let Some(id) = connection_id {
            url.query_pairs_mut()
                .append_pair("connection_id", &id.to_string());
        }
        self.send_json(self.request(Method::GET, url)).await
    }

    #[tracing::instrument(
        skip(self, request),
        fields(connection_id = ?request.connection_id),
        err(Display)
    )]
    async fn complete_oauth_callback(
        &self,
        connector_key: &str,
        request: &OAuthCallbackRequest,
    ) -> Result<OAuthCallbackResponse, ClientError> {
        let url = self.endpoint(&["oauth", connector_key, "callback"])?;
        self.send_json(self.request(Method::POST, url).json(request))
            .await
    }
}
