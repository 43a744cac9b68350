use serde::{Deserialize, Serialize};

use super::entities::DeliveryQuote;

/// Per-m³ rates for the first freighters of a plan.
pub const TIER_RATES: [f64; 2] = [150.0, 300.0];
/// Per-m³ rate for every freighter after the tiered ones.
pub const DEFAULT_RATE: f64 = 500.0;

/// Position-based delivery pricing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTariff {
    pub tiers: Vec<f64>,
    pub default_rate: f64,
}

impl Default for DeliveryTariff {
    fn default() -> Self {
        Self {
            tiers: TIER_RATES.to_vec(),
            default_rate: DEFAULT_RATE,
        }
    }
}

impl DeliveryTariff {
    pub fn rate_for(&self, position: usize) -> f64 {
        self.tiers
            .get(position)
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn quote(&self, position: usize, volume: f64) -> DeliveryQuote {
        let rate = self.rate_for(position);
        DeliveryQuote {
            rate,
            cost: volume * rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_step_up_by_position() {
        let tariff = DeliveryTariff::default();
        assert_eq!(tariff.rate_for(0), 150.0);
        assert_eq!(tariff.rate_for(1), 300.0);
        for position in 2..20 {
            assert_eq!(tariff.rate_for(position), 500.0);
        }
    }

    #[test]
    fn quote_multiplies_volume() {
        let quote = DeliveryTariff::default().quote(0, 50.0);
        assert_eq!(quote.rate, 150.0);
        assert_eq!(quote.cost, 7_500.0);
        assert_eq!(DeliveryTariff::default().quote(4, 0.0).cost, 0.0);
    }
}
