use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::availability::{Availability, Classified};

/// Identifier of an item type as used by the market data.
pub type TypeId = i64;

/// One line of the doctrine stock list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctrineStockEntry {
    #[serde(default, alias = "typeID")]
    pub type_id: Option<TypeId>,
    #[serde(default)]
    pub type_name: String,
    /// Units currently on market.
    #[serde(default)]
    pub quantity: i64,
    /// Desired stock level, where the doctrine defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DoctrineStockEntry {
    /// Units still needed to reach the target; zero when stocked or untargeted.
    pub fn shortfall(&self) -> i64 {
        self.target
            .map(|target| (target - self.quantity).max(0))
            .unwrap_or(0)
    }
}

impl Classified for DoctrineStockEntry {
    fn availability(&self) -> &Availability {
        &self.availability
    }
}
