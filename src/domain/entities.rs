use std::fmt;

use serde::{Deserialize, Serialize};

/// Type identifier assigned by the ESI universe endpoints.
pub type TypeId = i64;

/// One parsed line of the user's cargo list, before market data is attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    pub quantity: u64,
}

/// Volume and price data for a single inventory type, as returned by ESI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub type_id: TypeId,
    pub name: String,
    pub unit_volume: f64,
    pub unit_price: f64,
}

/// A requested good with everything the allocator needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quantity: u64,
    pub unit_volume: f64,
    pub unit_price: f64,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u64, unit_volume: f64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_volume,
            unit_price,
        }
    }

    pub fn total_volume(&self) -> f64 {
        self.quantity as f64 * self.unit_volume
    }

    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Price per unit of volume; an item without volume is infinitely dense.
    pub fn density(&self) -> f64 {
        if self.unit_volume == 0.0 {
            f64::INFINITY
        } else {
            self.unit_price / self.unit_volume
        }
    }
}

/// A fragment of an [`Item`] packed into one shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineAllocation {
    pub name: String,
    pub unit_volume: f64,
    pub unit_price: f64,
    pub quantity: u64,
}

impl LineAllocation {
    pub fn volume(&self) -> f64 {
        self.quantity as f64 * self.unit_volume
    }

    pub fn value(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// A single freighter load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub lines: Vec<LineAllocation>,
    pub total_volume: f64,
    pub total_value: f64,
}

impl Shipment {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn push_line(&mut self, item: &Item, quantity: u64) {
        self.total_volume += quantity as f64 * item.unit_volume;
        self.total_value += quantity as f64 * item.unit_price;
        self.lines.push(LineAllocation {
            name: item.name.clone(),
            unit_volume: item.unit_volume,
            unit_price: item.unit_price,
            quantity,
        });
    }
}

/// Delivery price for one shipment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryQuote {
    pub rate: f64,
    pub cost: f64,
}

/// A shipment together with its position in the allocation output and its quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotedShipment {
    /// Zero-based position in the allocator's output; survives display sorting.
    pub position: usize,
    pub shipment: Shipment,
    pub quote: DeliveryQuote,
}

impl QuotedShipment {
    pub fn label(&self) -> String {
        format!("Freighter {}", self.position + 1)
    }
}

/// Which per-shipment ceiling a capacity applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityAxis {
    Volume,
    Value,
}

impl fmt::Display for CapacityAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityAxis::Volume => f.write_str("volume"),
            CapacityAxis::Value => f.write_str("value"),
        }
    }
}

/// Per-shipment ceiling on one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    #[default]
    Unlimited,
    Limited(f64),
}

/// How many more units of an item fit along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisFit {
    /// The axis imposes no bound (no cap, or the item has no extent on it).
    Unbounded,
    /// Room for this many units; zero means the axis is exhausted.
    Units(u64),
}

impl AxisFit {
    pub fn min(self, other: AxisFit) -> AxisFit {
        match (self, other) {
            (AxisFit::Unbounded, fit) | (fit, AxisFit::Unbounded) => fit,
            (AxisFit::Units(a), AxisFit::Units(b)) => AxisFit::Units(a.min(b)),
        }
    }

    pub fn cap(self, remaining: u64) -> u64 {
        match self {
            AxisFit::Unbounded => remaining,
            AxisFit::Units(units) => units.min(remaining),
        }
    }
}

impl Capacity {
    /// Parses a user-entered cap. Blank, zero and infinite inputs mean "no limit".
    /// Returns `None` when the text is not a number.
    pub fn parse(raw: &str) -> Option<Capacity> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ',' | ' ' | '\u{a0}' | '\''))
            .collect();
        if cleaned.is_empty() {
            return Some(Capacity::Unlimited);
        }
        let value: f64 = cleaned.parse().ok()?;
        Some(Capacity::from_value(value))
    }

    pub fn from_value(value: f64) -> Capacity {
        if value == 0.0 || value == f64::INFINITY {
            Capacity::Unlimited
        } else {
            Capacity::Limited(value)
        }
    }

    pub fn from_option(value: Option<f64>) -> Capacity {
        value.map(Capacity::from_value).unwrap_or(Capacity::Unlimited)
    }

    pub fn limit(&self) -> Option<f64> {
        match self {
            Capacity::Unlimited => None,
            Capacity::Limited(max) => Some(*max),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Capacity::Unlimited => true,
            Capacity::Limited(max) => *max > 0.0 && !max.is_nan(),
        }
    }

    /// Whether a single unit of `per_unit` can ever fit into an empty shipment.
    pub fn admits(&self, per_unit: f64) -> bool {
        match self {
            Capacity::Unlimited => true,
            Capacity::Limited(max) => per_unit <= *max,
        }
    }

    pub fn units_fitting(&self, used: f64, per_unit: f64) -> AxisFit {
        let Capacity::Limited(max) = *self else {
            return AxisFit::Unbounded;
        };
        if per_unit <= 0.0 {
            return AxisFit::Unbounded;
        }
        let room = max - used;
        if room <= 0.0 {
            return AxisFit::Units(0);
        }
        AxisFit::Units((room / per_unit).floor() as u64)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Unlimited => f.write_str("no limit"),
            Capacity::Limited(max) => write!(f, "{max}"),
        }
    }
}

/// Hull class the user is loading; only used to suggest a volume cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipType {
    #[default]
    Freighter,
    JumpFreighter,
    BlockadeRunner,
    DeepSpaceTransport,
}

impl ShipType {
    pub const ALL: [ShipType; 4] = [
        ShipType::Freighter,
        ShipType::JumpFreighter,
        ShipType::BlockadeRunner,
        ShipType::DeepSpaceTransport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShipType::Freighter => "Freighter",
            ShipType::JumpFreighter => "Jump Freighter",
            ShipType::BlockadeRunner => "Blockade Runner",
            ShipType::DeepSpaceTransport => "Deep Space Transport",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ShipType::Freighter => "freighter",
            ShipType::JumpFreighter => "jump-freighter",
            ShipType::BlockadeRunner => "blockade-runner",
            ShipType::DeepSpaceTransport => "deep-space-transport",
        }
    }

    pub fn from_key(key: &str) -> Option<ShipType> {
        ShipType::ALL.into_iter().find(|ship| ship.key() == key)
    }

    /// Suggested volume cap in m³.
    pub fn volume_preset(&self) -> f64 {
        match self {
            ShipType::Freighter => 860_000.0,
            ShipType::JumpFreighter => 360_000.0,
            ShipType::BlockadeRunner => 12_500.0,
            ShipType::DeepSpaceTransport => 62_500.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_parse_treats_blank_and_zero_as_unlimited() {
        assert_eq!(Capacity::parse(""), Some(Capacity::Unlimited));
        assert_eq!(Capacity::parse("  0 "), Some(Capacity::Unlimited));
        assert_eq!(Capacity::parse("inf"), Some(Capacity::Unlimited));
        assert_eq!(
            Capacity::parse("860,000"),
            Some(Capacity::Limited(860_000.0))
        );
        assert_eq!(Capacity::parse("lots"), None);
    }

    #[test]
    fn negative_capacity_is_kept_but_invalid() {
        let cap = Capacity::parse("-5").unwrap();
        assert_eq!(cap, Capacity::Limited(-5.0));
        assert!(!cap.is_valid());
    }

    #[test]
    fn units_fitting_distinguishes_unbounded_and_exhausted() {
        let cap = Capacity::Limited(20.0);
        assert_eq!(cap.units_fitting(0.0, 5.0), AxisFit::Units(4));
        assert_eq!(cap.units_fitting(18.0, 5.0), AxisFit::Units(0));
        assert_eq!(cap.units_fitting(20.0, 5.0), AxisFit::Units(0));
        assert_eq!(cap.units_fitting(20.0, 0.0), AxisFit::Unbounded);
        assert_eq!(
            Capacity::Unlimited.units_fitting(1e12, 5.0),
            AxisFit::Unbounded
        );
    }

    #[test]
    fn axis_fit_min_and_cap() {
        assert_eq!(
            AxisFit::Unbounded.min(AxisFit::Units(3)),
            AxisFit::Units(3)
        );
        assert_eq!(AxisFit::Units(7).min(AxisFit::Units(3)), AxisFit::Units(3));
        assert_eq!(AxisFit::Unbounded.cap(12), 12);
        assert_eq!(AxisFit::Units(4).cap(12), 4);
    }

    #[test]
    fn density_of_weightless_item_is_infinite() {
        let item = Item::new("Skill Injector", 1, 0.0, 900_000_000.0);
        assert!(item.density().is_infinite());
        let ore = Item::new("Tritanium", 100, 0.01, 5.0);
        assert!((ore.density() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn ship_type_keys_round_trip() {
        for ship in ShipType::ALL {
            assert_eq!(ShipType::from_key(ship.key()), Some(ship));
        }
        assert_eq!(ShipType::from_key("titan"), None);
    }
}
