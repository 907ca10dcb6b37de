use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

mod test_utils;
use test_utils::{body_text, console, get};

fn encoded_state(json: &str) -> String {
    url_encode(&STANDARD.encode(json))
}

fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[tokio::test]
async fn successful_callback_redirects_after_delay() {
    let server = MockServer::start().await;
    let raw_state = STANDARD.encode(r#"{"connector_key":"github","connection_id":42}"#);
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/github/callback"))
        .and(body_json(json!({
            "code": "abc",
            "state": raw_state,
            "connection_id": 42
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = format!(
        "/oauth/callback?code=abc&state={}",
        encoded_state(r#"{"connector_key":"github","connection_id":42}"#)
    );
    let html = body_text(get(console(&server), &uri).await).await;

    assert!(html.contains("OAuth connection successful!"));
    assert!(html.contains(r#"<meta http-equiv="refresh" content="2;url="#));
    assert!(html.contains("Redirecting to connections page..."));
}

#[tokio::test]
async fn provider_error_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let html = body_text(
        get(
            console(&server),
            "/oauth/callback?error=access_denied&error_description=User%20declined",
        )
        .await,
    )
    .await;

    assert!(html.contains("User declined"));
    assert!(html.contains("Back to Connections"));
    assert!(!html.contains("http-equiv"));
}

#[tokio::test]
async fn malformed_state_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let states = vec![
        url_encode("***"),
        encoded_state("not json"),
        encoded_state(r#"{"connection_id":1}"#),
    ];
    for state in states {
        let uri = format!("/oauth/callback?code=abc&state={}", state);
        let html = body_text(get(console(&server), &uri).await).await;
        assert!(html.contains("Invalid OAuth state parameter"), "state {state}");
    }
}

#[tokio::test]
async fn missing_parameters_are_reported() {
    let server = MockServer::start().await;
    let html = body_text(get(console(&server), "/oauth/callback?code=abc").await).await;
    assert!(html.contains("Missing required OAuth parameters (code or state)"));
}

#[tokio::test]
async fn backend_rejection_message_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/jira/callback"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "State expired"})),
        )
        .mount(&server)
        .await;

    let uri = format!(
        "/oauth/callback?code=abc&state={}",
        encoded_state(r#"{"connector_key":"jira"}"#)
    );
    let html = body_text(get(console(&server), &uri).await).await;

    assert!(html.contains("State expired"));
    assert!(html.contains("status-error"));
}

#[tokio::test]
async fn backend_http_error_message_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth/jira/callback"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid authorization code"})),
        )
        .mount(&server)
        .await;

    let uri = format!(
        "/oauth/callback?code=abc&state={}",
        encoded_state(r#"{"connector_key":"jira"}"#)
    );
    let html = body_text(get(console(&server), &uri).await).await;
    assert!(html.contains("Invalid authorization code"));
}
