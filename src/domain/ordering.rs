//! Item ordering applied before allocation.

use serde::{Deserialize, Serialize};

use super::entities::Item;

/// Order in which items are handed to the allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitStrategy {
    /// Highest price per m³ first.
    #[default]
    #[serde(rename = "max-value", alias = "value-density")]
    MaxValue,
    /// Lowest volume-to-quantity ratio first.
    #[serde(rename = "min-cost", alias = "volume-per-unit")]
    MinCost,
    /// Keep the order the user pasted.
    #[serde(rename = "none")]
    None,
}

impl SplitStrategy {
    pub const ALL: [SplitStrategy; 3] = [
        SplitStrategy::MaxValue,
        SplitStrategy::MinCost,
        SplitStrategy::None,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MaxValue => "Maximize value per freighter",
            Self::MinCost => "Minimize delivery cost",
            Self::None => "Keep input order",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::MaxValue => "max-value",
            Self::MinCost => "min-cost",
            Self::None => "none",
        }
    }

    pub fn from_key(key: &str) -> Option<SplitStrategy> {
        match key {
            "max-value" | "value-density" => Some(Self::MaxValue),
            "min-cost" | "volume-per-unit" => Some(Self::MinCost),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Returns a reordered copy of `items`. Ties keep their input order.
pub fn order(items: &[Item], strategy: SplitStrategy) -> Vec<Item> {
    let mut ordered = items.to_vec();
    match strategy {
        SplitStrategy::MaxValue => {
            ordered.sort_by(|a, b| b.density().total_cmp(&a.density()));
        }
        SplitStrategy::MinCost => {
            // Uses the requested quantity, not whatever is left after splitting.
            ordered.sort_by(|a, b| volume_per_quantity(a).total_cmp(&volume_per_quantity(b)));
        }
        SplitStrategy::None => {}
    }
    ordered
}

fn volume_per_quantity(item: &Item) -> f64 {
    item.unit_volume / item.quantity as f64
}
