//! Greedy single-pass packing of items into freighter loads.

use std::mem;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::delivery::DeliveryTariff;
use super::entities::{Capacity, CapacityAxis, Item, QuotedShipment, Shipment};
use super::ordering::{order, SplitStrategy};
use super::summary::PlanSummary;

/// Contract line limit per freighter.
pub const MAX_LINES: usize = 250;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentLimits {
    pub max_volume: Capacity,
    pub max_value: Capacity,
}

impl ShipmentLimits {
    pub fn new(max_volume: Capacity, max_value: Capacity) -> Self {
        Self {
            max_volume,
            max_value,
        }
    }

    fn capacity(&self, axis: CapacityAxis) -> Capacity {
        match axis {
            CapacityAxis::Volume => self.max_volume,
            CapacityAxis::Value => self.max_value,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocationError {
    #[error("no items to split")]
    InputEmpty,
    #[error("could not find item: {0}")]
    UnresolvedItem(String),
    #[error(
        "no valid splits could be created with the given constraints \
         (max volume: {max_volume}, max value: {max_value})"
    )]
    NoFeasibleAllocation {
        max_volume: Capacity,
        max_value: Capacity,
    },
    #[error("{name} can never be shipped: one unit has {axis} {per_unit}, above the cap of {cap}")]
    StalledItem {
        name: String,
        axis: CapacityAxis,
        per_unit: f64,
        cap: f64,
    },
    #[error("max {axis} must be a positive number, got {value}")]
    InvalidCapacity { axis: CapacityAxis, value: f64 },
    #[error("invalid item {name}: {reason}")]
    InvalidItem { name: String, reason: &'static str },
}

/// A finished split: the resolved input, its freighters and their statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub items: Vec<Item>,
    pub strategy: SplitStrategy,
    pub limits: ShipmentLimits,
    pub shipments: Vec<QuotedShipment>,
    pub summary: PlanSummary,
}

impl SplitPlan {
    pub fn build(
        items: Vec<Item>,
        strategy: SplitStrategy,
        limits: ShipmentLimits,
    ) -> Result<Self, AllocationError> {
        let shipments = split_items(&items, strategy, &limits)?;
        let summary = PlanSummary::from_plan(&items, &shipments);
        Ok(Self {
            items,
            strategy,
            limits,
            shipments,
            summary,
        })
    }
}

/// Orders `items` with `strategy` and packs them.
pub fn split_items(
    items: &[Item],
    strategy: SplitStrategy,
    limits: &ShipmentLimits,
) -> Result<Vec<QuotedShipment>, AllocationError> {
    validate(items, limits)?;
    allocate(&order(items, strategy), limits)
}

/// Packs already-ordered items using the default delivery tariff.
pub fn allocate(
    items: &[Item],
    limits: &ShipmentLimits,
) -> Result<Vec<QuotedShipment>, AllocationError> {
    allocate_with_tariff(items, limits, &DeliveryTariff::default())
}

pub fn allocate_with_tariff(
    items: &[Item],
    limits: &ShipmentLimits,
    tariff: &DeliveryTariff,
) -> Result<Vec<QuotedShipment>, AllocationError> {
    validate(items, limits)?;

    let mut shipments: Vec<Shipment> = Vec::new();
    let mut current = Shipment::default();

    for item in items {
        let mut remaining = item.quantity;
        while remaining > 0 {
            let fit = limits
                .max_volume
                .units_fitting(current.total_volume, item.unit_volume)
                .min(
                    limits
                        .max_value
                        .units_fitting(current.total_value, item.unit_price),
                );
            let take = fit.cap(remaining);

            if take == 0 || current.line_count() >= MAX_LINES {
                if current.is_empty() {
                    // An empty freighter that cannot take a single unit would never change.
                    return Err(stalled(item, limits).unwrap_or(
                        AllocationError::NoFeasibleAllocation {
                            max_volume: limits.max_volume,
                            max_value: limits.max_value,
                        },
                    ));
                }
                shipments.push(mem::take(&mut current));
                continue;
            }

            current.push_line(item, take);
            remaining -= take;
        }
    }

    if !current.is_empty() {
        shipments.push(current);
    }

    if shipments.is_empty() {
        return Err(AllocationError::NoFeasibleAllocation {
            max_volume: limits.max_volume,
            max_value: limits.max_value,
        });
    }

    debug!(
        items = items.len(),
        shipments = shipments.len(),
        "allocated items into freighters"
    );

    Ok(shipments
        .into_iter()
        .enumerate()
        .map(|(position, shipment)| QuotedShipment {
            position,
            quote: tariff.quote(position, shipment.total_volume),
            shipment,
        })
        .collect())
}

fn validate(items: &[Item], limits: &ShipmentLimits) -> Result<(), AllocationError> {
    if items.is_empty() {
        return Err(AllocationError::InputEmpty);
    }

    for axis in [CapacityAxis::Volume, CapacityAxis::Value] {
        let capacity = limits.capacity(axis);
        if !capacity.is_valid() {
            return Err(AllocationError::InvalidCapacity {
                axis,
                value: capacity.limit().unwrap_or_default(),
            });
        }
    }

    for item in items {
        if item.quantity == 0 {
            return Err(invalid(item, "quantity must be at least 1"));
        }
        if !item.unit_volume.is_finite() || item.unit_volume < 0.0 {
            return Err(invalid(item, "unit volume must be a non-negative number"));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(invalid(item, "unit price must be a non-negative number"));
        }
        if let Some(error) = stalled(item, limits) {
            return Err(error);
        }
    }

    Ok(())
}

fn invalid(item: &Item, reason: &'static str) -> AllocationError {
    AllocationError::InvalidItem {
        name: item.name.clone(),
        reason,
    }
}

fn stalled(item: &Item, limits: &ShipmentLimits) -> Option<AllocationError> {
    [
        (CapacityAxis::Volume, item.unit_volume),
        (CapacityAxis::Value, item.unit_price),
    ]
    .into_iter()
    .find_map(|(axis, per_unit)| {
        let capacity = limits.capacity(axis);
        if capacity.admits(per_unit) {
            return None;
        }
        Some(AllocationError::StalledItem {
            name: item.name.clone(),
            axis,
            per_unit,
            cap: capacity.limit().unwrap_or(f64::INFINITY),
        })
    })
}
