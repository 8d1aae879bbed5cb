use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::appraisal::Appraisal;
use super::availability::{
    count_by_availability, filter_entries, AvailabilityCounts, VisibilityFlags,
};
use super::entities::DoctrineStockEntry;
use super::session::AppraisalSession;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub appraisal: AppraisalSession,
    pub stock: Vec<DoctrineStockEntry>,
    pub visibility: VisibilityFlags,
    pub stock_fetched_at: Option<SystemTime>,
}

impl AppState {
    pub fn visible_stock(&self) -> Vec<&DoctrineStockEntry> {
        filter_entries(&self.stock, self.visibility)
    }

    pub fn stock_counts(&self) -> AvailabilityCounts {
        count_by_availability(&self.stock)
    }

    pub fn replace_stock(&mut self, entries: Vec<DoctrineStockEntry>, fetched_at: SystemTime) {
        self.stock = entries;
        self.stock_fetched_at = Some(fetched_at);
    }

    pub fn is_stock_stale(&self, ttl: Duration) -> bool {
        self.stock_fetched_at
            .map(|time| time.elapsed().map(|elapsed| elapsed > ttl).unwrap_or(true))
            .unwrap_or(true)
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.visibility = persisted.visibility;
        let supplied = persisted
            .draft_raw
            .filter(|raw| !raw.trim().is_empty())
            .map(Appraisal::from_raw);
        self.appraisal.initialize(supplied);
    }

    pub fn to_persisted(&self) -> PersistedState {
        let raw = self.appraisal.draft().raw_text();
        PersistedState {
            visibility: self.visibility,
            draft_raw: (!raw.trim().is_empty()).then(|| raw.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub visibility: VisibilityFlags,
    #[serde(default)]
    pub draft_raw: Option<String>,
}
