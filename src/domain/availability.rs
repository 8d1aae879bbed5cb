//! Doctrine stock availability labels and the visibility filter applied to the stock list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stock/pricing classification of a doctrine stock entry.
///
/// The backend sends these as `SCREAMING_SNAKE_CASE` labels. Only `WELL_PRICED`
/// and `MISSING` carry filter semantics; every other label lands in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Availability {
    WellPriced,
    Missing,
    Other(String),
}

impl Availability {
    pub const WELL_PRICED: &'static str = "WELL_PRICED";
    pub const MISSING: &'static str = "MISSING";

    pub fn label(&self) -> &str {
        match self {
            Availability::WellPriced => Self::WELL_PRICED,
            Availability::Missing => Self::MISSING,
            Availability::Other(label) => label.as_str(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Availability::WellPriced => "Well priced",
            Availability::Missing => "Missing",
            Availability::Other(label) if label.is_empty() => "Unknown",
            Availability::Other(label) => label.as_str(),
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Other(String::new())
    }
}

impl From<&str> for Availability {
    fn from(value: &str) -> Self {
        match value {
            Self::WELL_PRICED => Availability::WellPriced,
            Self::MISSING => Availability::Missing,
            other => Availability::Other(other.to_string()),
        }
    }
}

impl From<String> for Availability {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::WELL_PRICED => Availability::WellPriced,
            Self::MISSING => Availability::Missing,
            _ => Availability::Other(value),
        }
    }
}

impl From<Option<String>> for Availability {
    fn from(value: Option<String>) -> Self {
        value.map(Availability::from).unwrap_or_default()
    }
}

impl From<Availability> for String {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Anything that carries an availability label and can be run through [`filter_entries`].
pub trait Classified {
    fn availability(&self) -> &Availability;
}

impl Classified for Availability {
    fn availability(&self) -> &Availability {
        self
    }
}

/// The two user toggles on the doctrine stock page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFlags {
    #[serde(default)]
    pub show_stocked: bool,
    /// Focus mode: when set, only missing entries are listed.
    #[serde(default)]
    pub show_missing_only: bool,
}

impl VisibilityFlags {
    pub fn new(show_stocked: bool, show_missing_only: bool) -> Self {
        Self {
            show_stocked,
            show_missing_only,
        }
    }
}

/// Decides whether a single entry is listed.
///
/// Focus mode overrides everything else and partitions on `Missing`. Outside
/// focus mode `show_stocked` only toggles the `WellPriced` bucket; all other
/// labels are always listed.
pub fn is_visible(availability: &Availability, flags: VisibilityFlags) -> bool {
    if flags.show_missing_only {
        return matches!(availability, Availability::Missing);
    }
    match availability {
        Availability::WellPriced => flags.show_stocked,
        Availability::Missing | Availability::Other(_) => true,
    }
}

/// Stable filter: returns the visible entries in their input order.
pub fn filter_entries<T: Classified>(entries: &[T], flags: VisibilityFlags) -> Vec<&T> {
    entries
        .iter()
        .filter(|entry| is_visible(entry.availability(), flags))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AvailabilityCounts {
    pub well_priced: usize,
    pub missing: usize,
    pub other: usize,
}

impl AvailabilityCounts {
    pub fn total(&self) -> usize {
        self.well_priced + self.missing + self.other
    }
}

pub fn count_by_availability<T: Classified>(entries: &[T]) -> AvailabilityCounts {
    entries
        .iter()
        .fold(AvailabilityCounts::default(), |mut counts, entry| {
            match entry.availability() {
                Availability::WellPriced => counts.well_priced += 1,
                Availability::Missing => counts.missing += 1,
                Availability::Other(_) => counts.other += 1,
            }
            counts
        })
}
