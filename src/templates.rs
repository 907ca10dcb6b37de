//! # Templates
//!
//! Page chrome and component markup live in `templates/` and are embedded at
//! compile time. `.html` templates render with HTML auto-escaping, so only
//! fragments produced by other templates are passed through as safe strings.

use std::sync::LazyLock;

use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Error, context};
use serde::Serialize;
use tracing::error;

use crate::telemetry;

const TEMPLATES: &[(&str, &str)] = &[
    ("style.css", include_str!("../templates/style.css")),
    ("partials.html", include_str!("../templates/partials.html")),
    ("layout.html", include_str!("../templates/layout.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("connector.html", include_str!("../templates/connector.html")),
    (
        "connector_details.html",
        include_str!("../templates/connector_details.html"),
    ),
    ("plugin_screen.html", include_str!("../templates/plugin_screen.html")),
    ("status_badge.html", include_str!("../templates/status_badge.html")),
    (
        "connection_form.html",
        include_str!("../templates/connection_form.html"),
    ),
    ("connections.html", include_str!("../templates/connections.html")),
    ("delete_prompt.html", include_str!("../templates/delete_prompt.html")),
    ("oauth_callback.html", include_str!("../templates/oauth_callback.html")),
];

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();

    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    // Error panels show the request's trace id as a support reference.
    env.add_function("trace_id", telemetry::current_trace_id);

    for &(name, source) in TEMPLATES {
        if let Err(err) = env.add_template(name, source) {
            error!(template = name, error = %err, "Failed to load template");
        }
    }

    env
});

/// Render the named template with `ctx`.
pub fn render_template<S: Serialize>(name: &str, ctx: S) -> Result<String, Error> {
    ENV.get_template(name)?.render(ctx)
}

/// Mark HTML produced by another template as safe for interpolation.
pub fn fragment(html: String) -> Value {
    Value::from_safe_string(html)
}

/// Extra `<head>` content for a page.
#[derive(Debug, Default, Clone)]
pub struct Head {
    /// `(seconds, target)` for a `meta refresh` navigation
    pub refresh: Option<(u64, String)>,
}

/// Wrap a rendered page body in the shared document layout.
pub fn layout(title: &str, head: &Head, body: String) -> Result<String, Error> {
    let refresh = head
        .refresh
        .as_ref()
        .map(|(seconds, target)| context! { seconds => seconds, target => target });

    render_template(
        "layout.html",
        context! {
            title => title,
            refresh => refresh,
            body => fragment(body),
        },
    )
}
