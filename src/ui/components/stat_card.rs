use dioxus::prelude::*;

use crate::ui::theme;

#[component]
pub fn StatCard(title: String, value: String, description: Option<String>) -> Element {
    rsx! {
        div { class: "{theme::PANEL} stat-card",
            h3 { class: theme::LABEL, "{title}" }
            p { class: "stat-value", "{value}" }
            if let Some(desc) = description {
                p { class: "{theme::TEXT_MUTED} small", "{desc}" }
            }
        }
    }
}
