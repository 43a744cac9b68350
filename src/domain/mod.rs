//! Cargo splitting logic lives here.

pub mod allocation;
pub mod app_state;
pub mod delivery;
pub mod entities;
pub mod export;
pub mod input;
pub mod ordering;
pub mod summary;

pub use allocation::{
    allocate, allocate_with_tariff, split_items, AllocationError, ShipmentLimits, SplitPlan,
    MAX_LINES,
};
pub use app_state::{AppState, CacheResource, CacheTimestamps, Preferences, ResolvedInput};
pub use delivery::{DeliveryTariff, DEFAULT_RATE, TIER_RATES};
pub use entities::{
    AxisFit, Capacity, CapacityAxis, DeliveryQuote, Item, ItemInfo, ItemRequest, LineAllocation,
    QuotedShipment, ShipType, Shipment, TypeId,
};
pub use export::{ExportFreighter, ExportLine, ExportRecord, EXPORT_FILENAME};
pub use input::{
    apply_suggestion, parse_item_list, resolve_items, suggest, unique_names, SUGGESTION_LIMIT,
};
pub use ordering::{order, SplitStrategy};
pub use summary::{sort_shipments, LineLoad, PlanSummary, ShipmentSort};
