//! # Connector Console
//!
//! Server-rendered administration console for a connector backend: browse
//! connectors, manage connections, and walk through OAuth authorization.

pub mod api_client;
pub mod components;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod oauth_state;
pub mod pages;
pub mod server;
pub mod telemetry;
pub mod templates;
