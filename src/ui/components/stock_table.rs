use dioxus::prelude::*;

use super::availability_badge::AvailabilityBadge;
use crate::domain::{Availability, DoctrineStockEntry};
use crate::ui::format::{format_isk, format_quantity};

#[derive(Clone, PartialEq)]
pub struct StockRow {
    pub key: String,
    pub type_name: String,
    pub quantity: i64,
    pub target: Option<i64>,
    pub shortfall: i64,
    pub price: Option<f64>,
    pub availability: Availability,
}

impl From<(usize, &DoctrineStockEntry)> for StockRow {
    fn from((idx, entry): (usize, &DoctrineStockEntry)) -> Self {
        Self {
            key: entry
                .type_id
                .map(|id| format!("{id}-{idx}"))
                .unwrap_or_else(|| format!("row-{idx}")),
            type_name: entry.type_name.clone(),
            quantity: entry.quantity,
            target: entry.target,
            shortfall: entry.shortfall(),
            price: entry.price,
            availability: entry.availability.clone(),
        }
    }
}

#[component]
pub fn StockTable(rows: Vec<StockRow>, empty_message: String) -> Element {
    let is_empty = rows.is_empty();
    rsx! {
        table {
            thead {
                tr {
                    th { "Item" }
                    th { class: "num", "On market" }
                    th { class: "num", "Target" }
                    th { class: "num", "Short" }
                    th { class: "num", "Price (ISK)" }
                    th { "Status" }
                }
            }
            tbody {
                for row in rows {
                    tr {
                        key: "{row.key}",
                        td { "{row.type_name}" }
                        td { class: "num", {format_quantity(row.quantity)} }
                        td { class: "num", {row.target.map(format_quantity).unwrap_or_else(|| "–".to_string())} }
                        td { class: "num", {format_quantity(row.shortfall)} }
                        td { class: "num", {row.price.map(format_isk).unwrap_or_else(|| "n/a".to_string())} }
                        td { AvailabilityBadge { availability: row.availability.clone() } }
                    }
                }
                if is_empty {
                    tr {
                        td { class: "muted", colspan: "6", "{empty_message}" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_types_get_distinct_row_keys() {
        let entries: Vec<DoctrineStockEntry> = serde_json::from_value(serde_json::json!([
            { "typeID": 11987, "typeName": "Guardian", "quantity": 1 },
            { "typeID": 11987, "typeName": "Guardian", "quantity": 3 },
            { "typeName": "Unlisted", "quantity": 0 }
        ]))
        .expect("stock decodes");

        let keys: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|row| StockRow::from(row).key)
            .collect();
        assert_eq!(keys, vec!["11987-0", "11987-1", "row-2"]);
    }
}
