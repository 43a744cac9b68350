//! Class names shared across pages. The rules live in `assets/main.css`.

use crate::domain::{LineLoad, DEFAULT_RATE, TIER_RATES};

pub const PANEL: &str = "panel";
pub const LABEL: &str = "field-label";
pub const INPUT: &str = "field-input";
pub const TEXT_MUTED: &str = "text-muted";
pub const BTN_PRIMARY: &str = "btn btn-primary";
pub const BTN_SECONDARY: &str = "btn btn-secondary";
pub const BTN_WARNING: &str = "btn btn-warning";

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-button nav-button-active"
    } else {
        "nav-button"
    }
}

pub fn line_load_badge(load: LineLoad) -> &'static str {
    match load {
        LineLoad::Normal => "badge badge-ok",
        LineLoad::High => "badge badge-warn",
        LineLoad::Max => "badge badge-danger",
    }
}

/// Cheaper tiers get calmer colours.
pub fn rate_badge(rate: f64) -> &'static str {
    if rate <= TIER_RATES[0] {
        "badge badge-ok"
    } else if rate < DEFAULT_RATE {
        "badge badge-warn"
    } else {
        "badge badge-danger"
    }
}
