//! Reusable page fragments backed by the templates in `templates/`.

pub mod connection_form;
pub mod connector_card;
pub mod plugin_screen;
pub mod status_badge;
