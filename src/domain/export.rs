use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use super::entities::QuotedShipment;
use super::summary::PlanSummary;

pub const EXPORT_FILENAME: &str = "freight_results.json";

/// Plain-data snapshot of a split plan, written out as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub plan_id: Uuid,
    pub generated_at: String,
    pub stats: PlanSummary,
    pub freighters: Vec<ExportFreighter>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportFreighter {
    pub name: String,
    pub items: Vec<ExportLine>,
    pub volume: f64,
    pub value: f64,
    pub delivery_rate: f64,
    pub delivery_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportLine {
    pub name: String,
    pub quantity: u64,
}

impl ExportRecord {
    /// Freighters are written in the order given, so a sorted view exports as shown.
    pub fn new(summary: &PlanSummary, shipments: &[QuotedShipment]) -> Self {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            plan_id: Uuid::new_v4(),
            generated_at,
            stats: summary.clone(),
            freighters: shipments.iter().map(ExportFreighter::from).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&QuotedShipment> for ExportFreighter {
    fn from(entry: &QuotedShipment) -> Self {
        Self {
            name: entry.label(),
            items: entry
                .shipment
                .lines
                .iter()
                .map(|line| ExportLine {
                    name: line.name.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            volume: entry.shipment.total_volume,
            value: entry.shipment.total_value,
            delivery_rate: entry.quote.rate,
            delivery_cost: entry.quote.cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::{allocate, ShipmentLimits};
    use crate::domain::entities::{Capacity, Item};

    #[test]
    fn record_lists_every_freighter_with_its_quote() {
        let items = vec![Item::new("Tritanium", 30, 5.0, 1.0)];
        let plan = allocate(
            &items,
            &ShipmentLimits::new(Capacity::Limited(100.0), Capacity::Unlimited),
        )
        .unwrap();
        let summary = PlanSummary::from_plan(&items, &plan);
        let record = ExportRecord::new(&summary, &plan);

        assert_eq!(record.freighters.len(), 2);
        assert_eq!(record.freighters[0].name, "Freighter 1");
        assert_eq!(record.freighters[0].items[0].quantity, 20);
        assert_eq!(record.freighters[1].delivery_rate, 300.0);
        assert_eq!(record.freighters[1].delivery_cost, 50.0 * 300.0);
        assert!(OffsetDateTime::parse(&record.generated_at, &Rfc3339).is_ok());

        let json = record.to_json().unwrap();
        let parsed: ExportRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
