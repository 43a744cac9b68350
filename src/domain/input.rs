//! Cargo list parsing, autocomplete and market-data joins.

use std::collections::HashMap;

use super::allocation::AllocationError;
use super::entities::{Item, ItemInfo, ItemRequest};

pub const SUGGESTION_LIMIT: usize = 5;

/// Parses a tab-separated cargo list (`name<TAB>quantity[<TAB>...]`).
///
/// Lines without a usable positive quantity are skipped. Repeated names are
/// merged into the first occurrence so every name appears once.
pub fn parse_item_list(input: &str) -> Vec<ItemRequest> {
    let mut requests: Vec<ItemRequest> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for line in input.trim().lines() {
        let mut columns = line.trim().split('\t');
        let (Some(name), Some(quantity)) = (columns.next(), columns.next()) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let Some(quantity) = parse_quantity(quantity) else {
            continue;
        };

        match index_by_name.get(name) {
            Some(&index) => {
                let existing = &mut requests[index];
                existing.quantity = existing.quantity.saturating_add(quantity);
            }
            None => {
                index_by_name.insert(name.to_string(), requests.len());
                requests.push(ItemRequest {
                    name: name.to_string(),
                    quantity,
                });
            }
        }
    }

    requests
}

fn parse_quantity(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ',' | ' ' | '\u{a0}' | '\''))
        .collect();
    digits.parse::<u64>().ok().filter(|quantity| *quantity > 0)
}

pub fn unique_names(requests: &[ItemRequest]) -> Vec<String> {
    requests.iter().map(|request| request.name.clone()).collect()
}

/// Catalog names starting with the fragment on the last line of `input`.
pub fn suggest(catalog: &[String], input: &str, limit: usize) -> Vec<String> {
    let fragment = input.rsplit('\n').next().unwrap_or_default().trim();
    if fragment.is_empty() {
        return Vec::new();
    }
    let fragment = fragment.to_lowercase();
    catalog
        .iter()
        .filter(|name| name.to_lowercase().starts_with(&fragment))
        .take(limit)
        .cloned()
        .collect()
}

/// Replaces the last line of `input` with the chosen name, ready for a quantity.
pub fn apply_suggestion(input: &str, name: &str) -> String {
    let head = match input.rfind('\n') {
        Some(index) => &input[..=index],
        None => "",
    };
    format!("{head}{name}\t")
}

/// Attaches market data to every request. The first unknown name aborts.
pub fn resolve_items(
    requests: &[ItemRequest],
    infos: &HashMap<String, ItemInfo>,
) -> Result<Vec<Item>, AllocationError> {
    let by_lower_name: HashMap<String, &ItemInfo> = infos
        .values()
        .map(|info| (info.name.to_lowercase(), info))
        .collect();

    requests
        .iter()
        .map(|request| {
            let info = infos
                .get(&request.name)
                .or_else(|| by_lower_name.get(&request.name.to_lowercase()).copied())
                .ok_or_else(|| AllocationError::UnresolvedItem(request.name.clone()))?;
            Ok(Item {
                name: request.name.clone(),
                quantity: request.quantity,
                unit_volume: info.unit_volume,
                unit_price: info.unit_price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(type_id: i64, name: &str, unit_volume: f64, unit_price: f64) -> ItemInfo {
        ItemInfo {
            type_id,
            name: name.to_string(),
            unit_volume,
            unit_price,
        }
    }

    #[test]
    fn parses_inventory_clipboard_rows() {
        let input = "Tritanium\t1,000,000\tMineral\t10,000 m3\n\
                     Pyerite\t250000\n\
                     \n\
                     Broken line without tabs\n\
                     Mexallon\tmany\n\
                     Isogen\t0\n";
        let parsed = parse_item_list(input);
        assert_eq!(
            parsed,
            vec![
                ItemRequest {
                    name: "Tritanium".into(),
                    quantity: 1_000_000
                },
                ItemRequest {
                    name: "Pyerite".into(),
                    quantity: 250_000
                },
            ]
        );
    }

    #[test]
    fn duplicate_names_are_merged_in_place() {
        let parsed = parse_item_list("A\t1\nB\t2\nA\t5");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "A");
        assert_eq!(parsed[0].quantity, 6);
        assert_eq!(parsed[1].quantity, 2);
        assert_eq!(unique_names(&parsed), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn suggestions_follow_the_last_line() {
        let catalog: Vec<String> = ["Tritanium", "Tritanium Bar", "Pyerite", "Trinary Data"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            suggest(&catalog, "Pyerite\t10\ntrit", SUGGESTION_LIMIT),
            vec!["Tritanium".to_string(), "Tritanium Bar".to_string()]
        );
        assert_eq!(suggest(&catalog, "tri", 1), vec!["Tritanium".to_string()]);
        assert!(suggest(&catalog, "Tritanium\t5\n", SUGGESTION_LIMIT).is_empty());
    }

    #[test]
    fn suggestion_replaces_only_the_last_line() {
        assert_eq!(apply_suggestion("trit", "Tritanium"), "Tritanium\t");
        assert_eq!(
            apply_suggestion("Pyerite\t10\nmeg", "Megacyte"),
            "Pyerite\t10\nMegacyte\t"
        );
    }

    #[test]
    fn resolve_matches_names_case_insensitively() {
        let mut infos = HashMap::new();
        infos.insert("Tritanium".to_string(), info(34, "Tritanium", 0.01, 4.5));
        let requests = vec![ItemRequest {
            name: "tritanium".into(),
            quantity: 100,
        }];
        let items = resolve_items(&requests, &infos).unwrap();
        assert_eq!(items, vec![Item::new("tritanium", 100, 0.01, 4.5)]);
    }

    #[test]
    fn resolve_fails_on_first_unknown_item() {
        let mut infos = HashMap::new();
        infos.insert("Tritanium".to_string(), info(34, "Tritanium", 0.01, 4.5));
        let requests = vec![
            ItemRequest {
                name: "Tritanium".into(),
                quantity: 1,
            },
            ItemRequest {
                name: "Unobtainium".into(),
                quantity: 1,
            },
        ];
        assert_eq!(
            resolve_items(&requests, &infos),
            Err(AllocationError::UnresolvedItem("Unobtainium".into()))
        );
    }
}
