//! Shared helpers for integration tests: a mock connector backend and a console
//! router wired to it.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use connector_console::{
    api_client::HttpApiClient,
    config::AppConfig,
    server::{AppState, create_app},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

pub fn connector_json(key: &str, name: &str, supports_oauth: bool) -> Value {
    json!({
        "id": 1,
        "key": key,
        "name": name,
        "supports_oauth": supports_oauth,
        "oauth_scopes": if supports_oauth { json!(["repo", "read:org"]) } else { Value::Null },
        "config_schema": null,
    })
}

pub fn connection_json(id: i64, connector: Value, status: &str, config: Value) -> Value {
    json!({
        "id": id,
        "connector": connector,
        "status": status,
        "has_oauth_token": false,
        "config_data": config,
    })
}

pub fn client_for(server: &MockServer, token: Option<&str>) -> HttpApiClient {
    let base = Url::parse(&server.uri()).unwrap();
    HttpApiClient::new(base, token.map(str::to_string)).unwrap()
}

/// Console router talking to the mock backend.
pub fn console(server: &MockServer) -> Router {
    let config = AppConfig {
        api_base_url: server.uri(),
        public_url: "https://console.example.com".to_string(),
        ..Default::default()
    };
    let api = HttpApiClient::from_config(&config).unwrap();
    create_app(AppState {
        config: Arc::new(config),
        api: Arc::new(api),
    })
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: Router, uri: &str, form: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
