//! Status badge: maps a connection status to a tone and a capitalized label.

use minijinja::{Error, context};

use crate::models::ConnectionStatus;
use crate::templates::render_template;

/// Color treatment of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Gray,
    Amber,
    Red,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Green => "badge-green",
            Tone::Gray => "badge-gray",
            Tone::Amber => "badge-amber",
            Tone::Red => "badge-red",
        }
    }
}

/// The four statuses a badge can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStatus {
    Active,
    Inactive,
    Pending,
    Error,
}

impl From<&ConnectionStatus> for BadgeStatus {
    fn from(status: &ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Active => BadgeStatus::Active,
            ConnectionStatus::Inactive => BadgeStatus::Inactive,
            ConnectionStatus::Pending => BadgeStatus::Pending,
            // Unrecognized values fall back to the error treatment.
            ConnectionStatus::Error | ConnectionStatus::Unrecognized(_) => BadgeStatus::Error,
        }
    }
}

impl BadgeStatus {
    pub fn tone(self) -> Tone {
        match self {
            BadgeStatus::Active => Tone::Green,
            BadgeStatus::Inactive => Tone::Gray,
            BadgeStatus::Pending => Tone::Amber,
            BadgeStatus::Error => Tone::Red,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BadgeStatus::Active => "Active",
            BadgeStatus::Inactive => "Inactive",
            BadgeStatus::Pending => "Pending",
            BadgeStatus::Error => "Error",
        }
    }
}

pub fn render(status: &ConnectionStatus) -> Result<String, Error> {
    let badge = BadgeStatus::from(status);
    render_template(
        "status_badge.html",
        context! {
            label => badge.label(),
            tone => badge.tone().css_class(),
        },
    )
}
