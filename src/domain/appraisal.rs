use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An appraisal request and, after a successful round-trip, the backend's valuation.
///
/// Both live in the same value: the user fills in `raw`, the backend answers with
/// a complete `Appraisal` that replaces the draft. Fields this client does not
/// know about are kept in `extra` so nothing is lost on the way through.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appraisal {
    /// Pasted item lines, e.g. `Tritanium 1000`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jita_buy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jita_sell: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyback_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<AppraisalItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appraisal {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::default()
        }
    }

    pub fn raw_text(&self) -> &str {
        self.raw.as_deref().unwrap_or_default()
    }

    /// True when the user has not entered anything and the backend has attached nothing.
    pub fn is_blank(&self) -> bool {
        self.raw_text().trim().is_empty()
            && !self.has_valuation()
            && self.link.is_none()
            && self.extra.is_empty()
    }

    /// Non-empty input lines, as they would be parsed by the backend.
    pub fn input_lines(&self) -> impl Iterator<Item = &str> {
        self.raw_text()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Buyback total: the backend's figure when present, otherwise the sum of the lines.
    pub fn buyback_total(&self) -> f64 {
        self.buyback_price
            .unwrap_or_else(|| self.items.iter().map(AppraisalItem::buyback_value).sum())
    }

    pub fn has_valuation(&self) -> bool {
        self.buyback_price.is_some() || !self.items.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalItem {
    #[serde(default, rename = "typeID", alias = "typeId")]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub jita_buy_per_unit: f64,
    #[serde(default)]
    pub jita_sell_per_unit: f64,
    /// Buyback rate as a fraction of Jita buy; items without a rate are bought at par.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppraisalItem {
    pub fn effective_rate(&self) -> f64 {
        self.rate.unwrap_or(1.0)
    }

    pub fn jita_buy_value(&self) -> f64 {
        self.jita_buy_per_unit * self.quantity as f64
    }

    pub fn buyback_value(&self) -> f64 {
        self.jita_buy_value() * self.effective_rate()
    }
}
