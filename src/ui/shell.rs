use dioxus::prelude::*;

use crate::app::Route;
use crate::domain::AppState;
use crate::ui::theme;
use crate::util::version::{version_label, APP_AUTHOR, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let current_route = use_route::<Route>();
    let nav = use_navigator();

    let (ship_label, strategy_label) = state.with(|st| {
        (
            st.preferences.ship_type.label(),
            st.preferences.strategy.label(),
        )
    });

    rsx! {
        div { class: "app-shell",
            header { class: "app-header",
                div { class: "app-header-inner",
                    div {
                        h1 { class: "app-title", "{APP_NAME}" }
                        p { class: "{theme::TEXT_MUTED} small", "{ship_label} · {strategy_label}" }
                    }
                    nav { class: "app-nav",
                        NavButton {
                            active: matches!(current_route, Route::Splitter {}),
                            onclick: move |_| { nav.push(Route::Splitter {}); },
                            label: "Splitter",
                        }
                        NavButton {
                            active: matches!(current_route, Route::Settings {}),
                            onclick: move |_| { nav.push(Route::Settings {}); },
                            label: "Settings",
                        }
                    }
                }
            }
            main { class: "app-main",
                {children}
            }
            footer { class: "app-footer {theme::TEXT_MUTED}",
                "{version_label()} · by {APP_AUTHOR} · market data from EVE ESI"
            }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: theme::nav_button(active),
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
