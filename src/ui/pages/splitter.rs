use dioxus::prelude::*;

use crate::{
    app::{persist_user_state, SplitRequest, Store},
    domain::{
        apply_suggestion, sort_shipments, suggest, AppState, Capacity, CapacityAxis,
        ExportRecord, ShipType, ShipmentLimits, ShipmentSort, SplitPlan, SplitStrategy,
        SUGGESTION_LIMIT,
    },
    infra::export::{default_export_dir, write_export},
    ui::{
        components::{
            freighter_card::FreighterCard,
            stat_card::StatCard,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
    util::format::{format_isk, format_number, format_volume},
};

const PLACEHOLDER: &str = "Paste from the inventory window, one item per line:\nTritanium\t1,000,000\nMegacyte\t2,500";

#[component]
pub fn SplitterPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let store = use_context::<Store>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let mut split_request = use_context::<Signal<Option<SplitRequest>>>();

    let initial = state.with(|st| {
        (
            st.resolved
                .as_ref()
                .map(|resolved| resolved.input.clone())
                .unwrap_or_default(),
            st.preferences.clone(),
        )
    });
    let mut cargo_input = use_signal(|| initial.0.clone());
    let mut volume_input = use_signal(|| cap_text(initial.1.max_volume));
    let mut value_input = use_signal(|| cap_text(initial.1.max_value));
    let mut sort = use_signal(ShipmentSort::default);

    let (catalog_empty, suggestions) = state.with(|st| {
        (
            st.catalog.is_empty(),
            suggest(&st.catalog, &cargo_input(), SUGGESTION_LIMIT),
        )
    });
    let (preferences, loading, plan) =
        state.with(|st| (st.preferences.clone(), st.loading, st.plan.clone()));
    let shown = plan
        .as_ref()
        .map(|plan| sort_shipments(&plan.shipments, sort()))
        .unwrap_or_default();

    let apply_limits = {
        let store = store.clone();
        move || -> bool {
            let limits = match read_limits(&volume_input(), &value_input()) {
                Ok(limits) => limits,
                Err(message) => {
                    push_toast(toasts, ToastKind::Error, message);
                    return false;
                }
            };
            state.with_mut(|st| st.preferences.set_limits(limits));
            persist_user_state(&state, &store);
            true
        }
    };

    let on_ship_type = {
        let store = store.clone();
        move |evt: FormEvent| {
            let Some(ship_type) = ShipType::from_key(&evt.value()) else {
                return;
            };
            let preset = ship_type.volume_preset();
            volume_input.set(cap_text(Some(preset)));
            state.with_mut(|st| {
                st.preferences.ship_type = ship_type;
                st.preferences.max_volume = Some(preset);
            });
            persist_user_state(&state, &store);
        }
    };

    let on_strategy = {
        let store = store.clone();
        move |evt: FormEvent| {
            let Some(strategy) = SplitStrategy::from_key(&evt.value()) else {
                return;
            };
            state.with_mut(|st| st.preferences.strategy = strategy);
            persist_user_state(&state, &store);
            resplit(state, toasts);
        }
    };

    let on_split = {
        let mut apply_limits = apply_limits;
        move |refresh: bool| {
            let input = cargo_input();
            if input.trim().is_empty() {
                push_toast(toasts, ToastKind::Warning, "Paste a cargo list first.");
                return;
            }
            if !apply_limits() {
                return;
            }
            split_request.set(Some(SplitRequest { input, refresh }));
        }
    };
    let mut on_split_refresh = on_split.clone();
    let mut on_split = on_split;

    let on_export = {
        let shown = shown.clone();
        move |_| {
            let Some(summary) = state.with(|st| st.plan.as_ref().map(|plan| plan.summary.clone()))
            else {
                return;
            };
            let record = ExportRecord::new(&summary, &shown);
            match write_export(&record, &default_export_dir()) {
                Ok(path) => push_toast(
                    toasts,
                    ToastKind::Success,
                    format!("Exported plan to {}", path.display()),
                ),
                Err(error) => push_toast(toasts, ToastKind::Error, error.to_string()),
            }
        }
    };

    let on_clear = move |_| {
        cargo_input.set(String::new());
        state.with_mut(|st| st.clear_results());
    };

    rsx! {
        div { class: "page",
            section { class: "{theme::PANEL} section",
                h2 { class: theme::LABEL, "Cargo" }
                textarea {
                    class: "{theme::INPUT} cargo-input",
                    rows: 10,
                    placeholder: PLACEHOLDER,
                    value: cargo_input(),
                    oninput: move |evt| cargo_input.set(evt.value()),
                }
                if !suggestions.is_empty() {
                    ul { class: "suggestions",
                        for name in suggestions {
                            li {
                                key: "{name}",
                                onclick: {
                                    let name = name.clone();
                                    move |_| {
                                        let next = apply_suggestion(&cargo_input(), &name);
                                        cargo_input.set(next);
                                    }
                                },
                                "{name}"
                            }
                        }
                    }
                }
                if catalog_empty {
                    p { class: "{theme::TEXT_MUTED} small", "Autocomplete is loading or unavailable." }
                }
            }

            section { class: "{theme::PANEL} section",
                h2 { class: theme::LABEL, "Freighter" }
                div { class: "form-grid",
                    div {
                        label { class: theme::LABEL, "Ship type" }
                        select {
                            class: theme::INPUT,
                            value: preferences.ship_type.key(),
                            onchange: on_ship_type,
                            for ship_type in ShipType::ALL {
                                option {
                                    value: ship_type.key(),
                                    selected: ship_type == preferences.ship_type,
                                    "{ship_type.label()} ({format_volume(ship_type.volume_preset())})"
                                }
                            }
                        }
                    }
                    div {
                        label { class: theme::LABEL, "Max volume (m³, blank for no limit)" }
                        input {
                            class: theme::INPUT,
                            value: volume_input(),
                            oninput: move |evt| volume_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: theme::LABEL, "Max value (ISK, blank for no limit)" }
                        input {
                            class: theme::INPUT,
                            value: value_input(),
                            oninput: move |evt| value_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: theme::LABEL, "Strategy" }
                        select {
                            class: theme::INPUT,
                            value: preferences.strategy.key(),
                            onchange: on_strategy,
                            for strategy in SplitStrategy::ALL {
                                option {
                                    value: strategy.key(),
                                    selected: strategy == preferences.strategy,
                                    "{strategy.label()}"
                                }
                            }
                        }
                    }
                }
                div { class: "button-row",
                    button {
                        class: theme::BTN_PRIMARY,
                        disabled: loading,
                        onclick: move |_| on_split(false),
                        if loading { "Splitting…" } else { "Split cargo" }
                    }
                    button {
                        class: theme::BTN_SECONDARY,
                        disabled: loading,
                        onclick: move |_| on_split_refresh(true),
                        "Refresh prices"
                    }
                    button { class: theme::BTN_SECONDARY, onclick: on_clear, "Clear" }
                }
            }

            if let Some(plan) = plan {
                PlanOverview { plan }
                section { class: "section",
                    div { class: "results-toolbar",
                        select {
                            class: theme::INPUT,
                            value: sort().key(),
                            onchange: move |evt: FormEvent| {
                                if let Some(choice) = ShipmentSort::from_key(&evt.value()) {
                                    sort.set(choice);
                                }
                            },
                            for choice in ShipmentSort::ALL {
                                option { value: choice.key(), selected: choice == sort(), "{choice.label()}" }
                            }
                        }
                        button { class: theme::BTN_SECONDARY, onclick: on_export, "Export JSON" }
                    }
                    div { class: "freighter-grid",
                        for entry in shown {
                            FreighterCard { key: "{entry.position}", entry }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn PlanOverview(plan: SplitPlan) -> Element {
    let summary = &plan.summary;
    rsx! {
        section { class: "stat-grid",
            StatCard {
                title: "Freighters".to_string(),
                value: format_number(summary.freighter_count as f64, 0),
                description: Some(format!("{} item types", summary.item_count)),
            }
            StatCard {
                title: "Total volume".to_string(),
                value: format_volume(summary.total_volume),
                description: Some(format!("avg {}", format_volume(summary.average_volume))),
            }
            StatCard {
                title: "Total value".to_string(),
                value: format_isk(summary.total_value),
                description: Some(format!("avg {}", format_isk(summary.average_value))),
            }
            StatCard {
                title: "Delivery cost".to_string(),
                value: format_isk(summary.total_delivery_cost),
                description: Some(plan.strategy.label().to_string()),
            }
        }
    }
}

/// Re-runs the split on already-resolved items after a strategy change.
fn resplit(mut state: Signal<AppState>, toasts: Signal<Vec<ToastMessage>>) {
    let Some((items, preferences)) = state.with(|st| {
        st.plan.as_ref()?;
        st.resolved
            .as_ref()
            .map(|resolved| (resolved.items.clone(), st.preferences.clone()))
    }) else {
        return;
    };
    match SplitPlan::build(items, preferences.strategy, preferences.limits()) {
        Ok(plan) => state.with_mut(|st| st.plan = Some(plan)),
        Err(error) => push_toast(toasts, ToastKind::Error, error.to_string()),
    }
}

fn read_limits(volume: &str, value: &str) -> Result<ShipmentLimits, String> {
    let parse = |raw: &str, axis: CapacityAxis| {
        Capacity::parse(raw)
            .filter(Capacity::is_valid)
            .ok_or_else(|| format!("Max {axis} must be a positive number or blank."))
    };
    Ok(ShipmentLimits::new(
        parse(volume, CapacityAxis::Volume)?,
        parse(value, CapacityAxis::Value)?,
    ))
}

fn cap_text(limit: Option<f64>) -> String {
    limit.map(|value| value.to_string()).unwrap_or_default()
}
