//! Reference data for the four-level location hierarchy.
//!
//! Each level gets its own id newtype so a town id can never be handed to a
//! country lookup, and the parent chain Town → State → Country → Continent is
//! traversable by construction. Ids are stable, manually assigned references;
//! id `0` is reserved to mean "unspecified" in legacy wire input and is never
//! minted for a real node.

use serde::{Deserialize, Serialize};

/// Reserved raw id meaning "no selection" in form input.
pub const UNSPECIFIED_ID: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContinentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TownId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub id: ContinentId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub code: String,
    pub name: String,
    pub continent: ContinentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub code: String,
    pub name: String,
    pub country: CountryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub id: TownId,
    pub code: String,
    pub name: String,
    pub state: StateId,
    pub kind: TownKind,
}

/// Settlement classification carried on town records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TownKind {
    City,
    Town,
    Village,
    Hamlet,
}

impl TownKind {
    pub fn label(self) -> &'static str {
        match self {
            TownKind::City => "city",
            TownKind::Town => "town",
            TownKind::Village => "village",
            TownKind::Hamlet => "hamlet",
        }
    }
}

/// The four concrete levels, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevel {
    Continent,
    Country,
    State,
    Town,
}

impl LocationLevel {
    pub fn label(self) -> &'static str {
        match self {
            LocationLevel::Continent => "continent",
            LocationLevel::Country => "country",
            LocationLevel::State => "state",
            LocationLevel::Town => "town",
        }
    }

    /// The next coarser level, or `None` at the top of the hierarchy.
    pub fn coarser(self) -> Option<LocationLevel> {
        match self {
            LocationLevel::Continent => None,
            LocationLevel::Country => Some(LocationLevel::Continent),
            LocationLevel::State => Some(LocationLevel::Country),
            LocationLevel::Town => Some(LocationLevel::State),
        }
    }
}

/// Canonical form for free-typed town names: trimmed, each whitespace-separated
/// word title-cased. Matching against existing towns is case-insensitive, so
/// this only affects how newly minted records are displayed.
pub fn normalize_town_name(raw: &str) -> String {
    raw.trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
