//! Plan statistics and display ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::allocation::MAX_LINES;
use super::entities::{Item, QuotedShipment, Shipment};

/// Line count from which a freighter is flagged as nearly full.
pub const HIGH_LINE_COUNT: usize = 200;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub item_count: usize,
    pub total_volume: f64,
    pub total_value: f64,
    pub freighter_count: usize,
    pub average_volume: f64,
    pub average_value: f64,
    pub total_delivery_cost: f64,
}

impl PlanSummary {
    pub fn from_plan(items: &[Item], shipments: &[QuotedShipment]) -> Self {
        let freighter_count = shipments.len();
        let (shipped_volume, shipped_value, total_delivery_cost) =
            shipments
                .iter()
                .fold((0.0, 0.0, 0.0), |(volume, value, cost), entry| {
                    (
                        volume + entry.shipment.total_volume,
                        value + entry.shipment.total_value,
                        cost + entry.quote.cost,
                    )
                });
        let (average_volume, average_value) = if freighter_count == 0 {
            (0.0, 0.0)
        } else {
            (
                shipped_volume / freighter_count as f64,
                shipped_value / freighter_count as f64,
            )
        };

        Self {
            item_count: items.len(),
            total_volume: items.iter().map(Item::total_volume).sum(),
            total_value: items.iter().map(Item::total_value).sum(),
            freighter_count,
            average_volume,
            average_value,
            total_delivery_cost,
        }
    }
}

/// How close a freighter is to the contract line limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineLoad {
    Normal,
    High,
    Max,
}

impl LineLoad {
    pub fn of(shipment: &Shipment) -> Self {
        match shipment.line_count() {
            count if count >= MAX_LINES => LineLoad::Max,
            count if count >= HIGH_LINE_COUNT => LineLoad::High,
            _ => LineLoad::Normal,
        }
    }
}

/// Display ordering for freighter cards. Always descending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShipmentSort {
    #[default]
    Position,
    Volume,
    Value,
    DeliveryCost,
}

impl ShipmentSort {
    pub const ALL: [ShipmentSort; 4] = [
        ShipmentSort::Position,
        ShipmentSort::Volume,
        ShipmentSort::Value,
        ShipmentSort::DeliveryCost,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Volume => "volume",
            Self::Value => "value",
            Self::DeliveryCost => "delivery-cost",
        }
    }

    pub fn from_key(key: &str) -> Option<ShipmentSort> {
        Self::ALL.into_iter().find(|sort| sort.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Position => "Plan order",
            Self::Volume => "Sort by Volume",
            Self::Value => "Sort by Value",
            Self::DeliveryCost => "Sort by Delivery Cost",
        }
    }
}

pub fn sort_shipments(shipments: &[QuotedShipment], sort: ShipmentSort) -> Vec<QuotedShipment> {
    let mut sorted = shipments.to_vec();
    let key = |entry: &QuotedShipment| match sort {
        ShipmentSort::Position => -(entry.position as f64),
        ShipmentSort::Volume => entry.shipment.total_volume,
        ShipmentSort::Value => entry.shipment.total_value,
        ShipmentSort::DeliveryCost => entry.quote.cost,
    };
    sorted.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::{allocate, ShipmentLimits};
    use crate::domain::entities::Capacity;

    fn sample_plan() -> (Vec<Item>, Vec<QuotedShipment>) {
        let items = vec![Item::new("A", 30, 5.0, 1.0), Item::new("B", 3, 1.0, 100.0)];
        let plan = allocate(
            &items,
            &ShipmentLimits::new(Capacity::Limited(40.0), Capacity::Unlimited),
        )
        .unwrap();
        (items, plan)
    }

    #[test]
    fn summary_totals_match_inputs_and_quotes() {
        let (items, plan) = sample_plan();
        // A: 8 + 8 + 8 + 6 units, B rides along in the last freighter.
        assert_eq!(plan.len(), 4);

        let summary = PlanSummary::from_plan(&items, &plan);
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.freighter_count, 4);
        assert_eq!(summary.total_volume, 153.0);
        assert_eq!(summary.total_value, 330.0);
        assert!((summary.average_volume - 153.0 / 4.0).abs() < 1e-9);
        assert_eq!(
            summary.total_delivery_cost,
            40.0 * 150.0 + 40.0 * 300.0 + 40.0 * 500.0 + 33.0 * 500.0
        );
    }

    #[test]
    fn empty_plan_has_zero_averages() {
        let summary = PlanSummary::from_plan(&[], &[]);
        assert_eq!(summary.average_volume, 0.0);
        assert_eq!(summary.average_value, 0.0);
    }

    #[test]
    fn sorting_keeps_positions_and_quotes() {
        let (_, plan) = sample_plan();
        let by_value = sort_shipments(&plan, ShipmentSort::Value);
        assert_eq!(by_value[0].position, 3);
        assert_eq!(by_value[0].quote.rate, 500.0);
        // Equal values keep plan order.
        let rest: Vec<usize> = by_value[1..].iter().map(|entry| entry.position).collect();
        assert_eq!(rest, vec![0, 1, 2]);

        let by_cost = sort_shipments(&plan, ShipmentSort::DeliveryCost);
        let positions: Vec<usize> = by_cost.iter().map(|entry| entry.position).collect();
        assert_eq!(positions, vec![2, 3, 1, 0]);

        let restored = sort_shipments(&by_cost, ShipmentSort::Position);
        assert_eq!(restored, plan);
    }

    #[test]
    fn line_load_thresholds() {
        let mut shipment = Shipment::default();
        let item = Item::new("x", 1, 1.0, 1.0);
        for _ in 0..199 {
            shipment.push_line(&item, 1);
        }
        assert_eq!(LineLoad::of(&shipment), LineLoad::Normal);
        shipment.push_line(&item, 1);
        assert_eq!(LineLoad::of(&shipment), LineLoad::High);
        for _ in 0..50 {
            shipment.push_line(&item, 1);
        }
        assert_eq!(LineLoad::of(&shipment), LineLoad::Max);
    }
}
