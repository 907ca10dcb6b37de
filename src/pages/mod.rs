//! Page bodies. Handlers wrap each body in [`crate::templates::layout`].

use url::Url;

pub mod connections;
pub mod connector;
pub mod home;
pub mod oauth_callback;

/// Console route that starts an OAuth authorization for a connector.
pub const OAUTH_INITIATE_PATH: &str = "/oauth/initiate";

/// Connector key percent-encoded as a single path segment of `/connectors/{key}`.
pub fn connector_segment(key: &str) -> String {
    let Ok(mut url) = Url::parse("http://console.invalid/") else {
        return key.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(key);
    }
    url.path().trim_start_matches('/').to_string()
}
