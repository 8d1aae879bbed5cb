use dioxus::prelude::*;

use crate::domain::AppraisalItem;
use crate::ui::format::{format_isk, format_quantity, format_rate};

#[derive(Clone, PartialEq)]
pub struct AppraisalRow {
    pub type_name: String,
    pub quantity: u64,
    pub jita_buy_per_unit: f64,
    pub rate: f64,
    pub buyback_value: f64,
}

impl From<&AppraisalItem> for AppraisalRow {
    fn from(item: &AppraisalItem) -> Self {
        Self {
            type_name: item.type_name.clone(),
            quantity: item.quantity,
            jita_buy_per_unit: item.jita_buy_per_unit,
            rate: item.effective_rate(),
            buyback_value: item.buyback_value(),
        }
    }
}

#[component]
pub fn AppraisalTable(rows: Vec<AppraisalRow>) -> Element {
    let is_empty = rows.is_empty();
    rsx! {
        table {
            thead {
                tr {
                    th { "Item" }
                    th { class: "num", "Quantity" }
                    th { class: "num", "Jita buy / unit" }
                    th { class: "num", "Rate" }
                    th { class: "num", "Buyback (ISK)" }
                }
            }
            tbody {
                for row in rows {
                    tr {
                        td { "{row.type_name}" }
                        td { class: "num", {format_quantity(row.quantity as i64)} }
                        td { class: "num", {format_isk(row.jita_buy_per_unit)} }
                        td { class: "num", {format_rate(row.rate)} }
                        td { class: "num", {format_isk(row.buyback_value)} }
                    }
                }
                if is_empty {
                    tr {
                        td { class: "muted", colspan: "5", "The backend returned no priced items." }
                    }
                }
            }
        }
    }
}
