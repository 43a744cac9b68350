use dioxus::prelude::*;

use crate::domain::{LineLoad, QuotedShipment, MAX_LINES};
use crate::ui::theme;
use crate::util::format::{format_isk, format_number, format_volume};

#[component]
pub fn FreighterCard(entry: QuotedShipment) -> Element {
    let mut expanded = use_signal(|| false);

    let shipment = &entry.shipment;
    let load = LineLoad::of(shipment);
    let lines = shipment.line_count();
    let label = entry.label();
    let volume = format_volume(shipment.total_volume);
    let value = format_isk(shipment.total_value);
    let rate = format_number(entry.quote.rate, 0);
    let cost = format_isk(entry.quote.cost);
    let rows: Vec<(String, String, String)> = shipment
        .lines
        .iter()
        .map(|line| {
            (
                line.name.clone(),
                format_number(line.quantity as f64, 0),
                format_volume(line.volume()),
            )
        })
        .collect();

    rsx! {
        article { class: "{theme::PANEL} freighter-card",
            header { class: "freighter-card-header",
                h3 { "{label}" }
                span { class: theme::line_load_badge(load), "{lines} / {MAX_LINES} lines" }
            }
            dl { class: "freighter-stats",
                div { dt { class: theme::LABEL, "Volume" } dd { "{volume}" } }
                div { dt { class: theme::LABEL, "Value" } dd { "{value}" } }
                div {
                    dt { class: theme::LABEL, "Delivery" }
                    dd {
                        span { class: theme::rate_badge(entry.quote.rate), "{rate} ISK/m³" }
                        " {cost}"
                    }
                }
            }
            button {
                class: theme::BTN_SECONDARY,
                onclick: move |_| expanded.toggle(),
                if expanded() { "Hide items" } else { "Show items" }
            }
            if expanded() {
                table { class: "line-table",
                    thead {
                        tr {
                            th { "Item" }
                            th { class: "numeric", "Quantity" }
                            th { class: "numeric", "Volume" }
                        }
                    }
                    tbody {
                        for (name, quantity, volume) in rows {
                            tr {
                                td { "{name}" }
                                td { class: "numeric", "{quantity}" }
                                td { class: "numeric", "{volume}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
