use std::time::SystemTime;

use dioxus::prelude::*;

use crate::{
    app::{persist_user_state, CatalogReload, Store},
    domain::{AppState, Preferences, DEFAULT_RATE, MAX_LINES, TIER_RATES},
    infra::{cache::CacheDir, esi::EsiClient},
    ui::{
        components::toast::{push_toast, ToastKind, ToastMessage},
        theme,
    },
    util::format::{age_string, format_number},
};

#[component]
pub fn SettingsPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let store = use_context::<Store>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let client = use_context::<Option<EsiClient>>();
    let CatalogReload(mut catalog_reload) = use_context::<CatalogReload>();

    let cache_entries = state.with(|st| {
        let mut entries = st
            .cache
            .iter()
            .map(|(resource, time)| (resource.label(), humanize_age(*time)))
            .collect::<Vec<_>>();
        entries.sort();
        entries
    });
    let catalog_size = state.with(|st| st.catalog.len());

    let tiers = TIER_RATES
        .iter()
        .enumerate()
        .map(|(index, rate)| (format!("Freighter {}", index + 1), format_number(*rate, 0)))
        .chain(std::iter::once((
            format!("Freighter {} and later", TIER_RATES.len() + 1),
            format_number(DEFAULT_RATE, 0),
        )))
        .collect::<Vec<_>>();

    let on_reset = move |_| {
        state.with_mut(|st| st.apply_persisted(Preferences::default()));
        persist_user_state(&state, &store);
        push_toast(toasts, ToastKind::Info, "Restored default freighter settings.");
    };

    let on_clear_prices = move |_| {
        let client = client.clone();
        let mut state = state;
        spawn(async move {
            if let Some(client) = client {
                client.clear_cache().await;
            }
            state.with_mut(|st| {
                st.cache.clear();
                st.resolved = None;
            });
            push_toast(
                toasts,
                ToastKind::Info,
                "Cleared cached market data. Prices will refresh on the next split.",
            );
        });
    };

    let on_reload_catalog = move |_| {
        if let Err(error) = CacheDir::default_location().clear_catalog() {
            push_toast(toasts, ToastKind::Error, format!("Could not remove catalog cache: {error}"));
            return;
        }
        state.with_mut(|st| st.catalog.clear());
        catalog_reload += 1;
        push_toast(toasts, ToastKind::Info, "Reloading item names from ESI…");
    };

    rsx! {
        div { class: "page",
            section { class: "{theme::PANEL} section",
                h2 { class: theme::LABEL, "Delivery Rates" }
                p { class: "{theme::TEXT_MUTED} small",
                    "Each freighter is billed per m³ by its position in the plan. Contracts hold at most {MAX_LINES} item lines."
                }
                ul { class: "kv-list",
                    for (label, rate) in tiers {
                        li {
                            span { "{label}" }
                            span { "{rate} ISK/m³" }
                        }
                    }
                }
            }

            section { class: "{theme::PANEL} section",
                h2 { class: theme::LABEL, "Cache Status" }
                if cache_entries.is_empty() {
                    p { class: "{theme::TEXT_MUTED} small", "No data fetched yet." }
                } else {
                    ul { class: "kv-list",
                        for (label, age) in cache_entries {
                            li {
                                span { "{label}" }
                                span { class: theme::TEXT_MUTED, "{age} ago" }
                            }
                        }
                    }
                }
                p { class: "{theme::TEXT_MUTED} small", "{catalog_size} item names available for autocomplete." }
                div { class: "button-row",
                    button { class: theme::BTN_WARNING, onclick: on_clear_prices, "Clear Market Cache" }
                    button { class: theme::BTN_SECONDARY, onclick: on_reload_catalog, "Reload Item Names" }
                }
            }

            section { class: "{theme::PANEL} section",
                h2 { class: theme::LABEL, "Preferences" }
                p { class: "{theme::TEXT_MUTED} small", "Ship type, limits and strategy are saved automatically." }
                div { class: "button-row",
                    button { class: theme::BTN_SECONDARY, onclick: on_reset, "Reset Defaults" }
                }
            }
        }
    }
}

fn humanize_age(time: SystemTime) -> String {
    time.elapsed()
        .map(age_string)
        .unwrap_or_else(|_| "0s".to_string())
}
