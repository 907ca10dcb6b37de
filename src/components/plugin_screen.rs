//! Plugin area wrapper: heading, optional description, and content card.

use minijinja::{Error, context};

use crate::templates::{fragment, render_template};

/// Render a plugin screen. `content` is rendered HTML; `None` shows the placeholder.
pub fn render(
    title: &str,
    description: Option<&str>,
    content: Option<String>,
) -> Result<String, Error> {
    render_template(
        "plugin_screen.html",
        context! {
            title => title,
            description => description,
            content => content.map(fragment),
            sample => sample(title),
        },
    )
}

fn sample(title: &str) -> String {
    let sample = serde_json::json!({
        "sample": true,
        "message": format!("This is where the {} plugin UI will render.", title),
    });
    serde_json::to_string_pretty(&sample).unwrap_or_default()
}
