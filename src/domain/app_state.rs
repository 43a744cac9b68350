use std::{collections::HashMap, time::SystemTime};

use serde::{Deserialize, Serialize};

use super::allocation::{ShipmentLimits, SplitPlan};
use super::entities::{Capacity, Item, ShipType};
use super::ordering::SplitStrategy;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub preferences: Preferences,
    /// Type names offered as autocomplete suggestions.
    pub catalog: Vec<String>,
    /// Market data for the last submitted cargo list, reused when only the strategy changes.
    pub resolved: Option<ResolvedInput>,
    pub plan: Option<SplitPlan>,
    pub loading: bool,
    pub cache: CacheTimestamps,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedInput {
    pub input: String,
    pub items: Vec<Item>,
}

impl AppState {
    pub fn apply_persisted(&mut self, persisted: Preferences) {
        self.preferences = persisted;
    }

    pub fn to_persisted(&self) -> Preferences {
        self.preferences.clone()
    }

    /// Items already resolved for exactly this input text.
    pub fn resolved_items_for(&self, input: &str) -> Option<Vec<Item>> {
        self.resolved
            .as_ref()
            .filter(|resolved| resolved.input == input)
            .map(|resolved| resolved.items.clone())
    }

    pub fn clear_results(&mut self) {
        self.plan = None;
        self.resolved = None;
    }
}

/// User settings that survive restarts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// `None` means no volume limit.
    #[serde(default)]
    pub max_volume: Option<f64>,
    /// `None` means no value limit.
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub ship_type: ShipType,
    #[serde(default)]
    pub strategy: SplitStrategy,
}

impl Default for Preferences {
    fn default() -> Self {
        let ship_type = ShipType::default();
        Self {
            max_volume: Some(ship_type.volume_preset()),
            max_value: None,
            ship_type,
            strategy: SplitStrategy::default(),
        }
    }
}

impl Preferences {
    pub fn limits(&self) -> ShipmentLimits {
        ShipmentLimits::new(
            Capacity::from_option(self.max_volume),
            Capacity::from_option(self.max_value),
        )
    }

    pub fn set_limits(&mut self, limits: ShipmentLimits) {
        self.max_volume = limits.max_volume.limit();
        self.max_value = limits.max_value.limit();
    }
}

#[derive(Clone, Debug, Default)]
pub struct CacheTimestamps {
    entries: HashMap<CacheResource, SystemTime>,
}

impl CacheTimestamps {
    pub fn record_fetch(&mut self, resource: CacheResource, fetched_at: SystemTime) {
        self.entries.insert(resource, fetched_at);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CacheResource, &SystemTime)> {
        self.entries.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheResource {
    Catalog,
    MarketPrices,
}

impl CacheResource {
    pub fn label(&self) -> &'static str {
        match self {
            CacheResource::Catalog => "Item catalog",
            CacheResource::MarketPrices => "Market prices",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_tolerate_missing_fields() {
        let prefs: Preferences = serde_json::from_str(r#"{"strategy":"min-cost"}"#).unwrap();
        assert_eq!(prefs.strategy, SplitStrategy::MinCost);
        assert_eq!(prefs.max_volume, None);
        assert_eq!(prefs.ship_type, ShipType::Freighter);
        assert_eq!(prefs.limits(), ShipmentLimits::default());
    }

    #[test]
    fn preferences_map_to_limits() {
        let mut prefs = Preferences::default();
        assert_eq!(
            prefs.limits().max_volume,
            Capacity::Limited(ShipType::Freighter.volume_preset())
        );
        prefs.set_limits(ShipmentLimits::new(
            Capacity::Unlimited,
            Capacity::Limited(5e9),
        ));
        assert_eq!(prefs.max_volume, None);
        assert_eq!(prefs.max_value, Some(5e9));
    }

    #[test]
    fn resolved_items_only_match_identical_input() {
        let mut state = AppState::default();
        state.resolved = Some(ResolvedInput {
            input: "Tritanium\t10".into(),
            items: vec![Item::new("Tritanium", 10, 0.01, 4.0)],
        });
        assert!(state.resolved_items_for("Tritanium\t10").is_some());
        assert!(state.resolved_items_for("Tritanium\t11").is_none());
        state.clear_results();
        assert!(state.resolved.is_none());
    }

    #[test]
    fn cache_timestamps_track_latest_fetch() {
        let mut cache = CacheTimestamps::default();
        assert_eq!(cache.iter().count(), 0);
        cache.record_fetch(CacheResource::Catalog, SystemTime::UNIX_EPOCH);
        cache.record_fetch(CacheResource::Catalog, SystemTime::now());
        cache.record_fetch(CacheResource::MarketPrices, SystemTime::now());
        assert_eq!(cache.iter().count(), 2);
        assert!(cache
            .iter()
            .all(|(_, time)| *time > SystemTime::UNIX_EPOCH));
        cache.clear();
        assert_eq!(cache.iter().count(), 0);
    }
}
