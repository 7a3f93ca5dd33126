//! Viewer-side filtering of listings by availability scope.
//!
//! The rules are additive: global listings pass for everyone, and each finer
//! scope adds a rule that requires equality at its own level *and* every
//! coarser one. The conjunction is deliberately flat rather than trusting the
//! parent chain of the stored state/town records, so a stray foreign key reused
//! across branches cannot leak a listing into the wrong country.

use serde::{Deserialize, Serialize};

use super::domain::{ContinentId, CountryId, StateId, TownId};
use super::scope::AvailabilityScope;

/// Where a listing was published: its declared granularity plus the location
/// node ids it carries, one per level, each optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub scope: AvailabilityScope,
    pub continent: Option<ContinentId>,
    pub country: Option<CountryId>,
    pub state: Option<StateId>,
    pub town: Option<TownId>,
}

impl Placement {
    pub fn global() -> Self {
        Self {
            scope: AvailabilityScope::Global,
            continent: None,
            country: None,
            state: None,
            town: None,
        }
    }
}

/// A viewer's own resolved position in the hierarchy. Every field is
/// independently optional; a partially resolved profile narrows visibility
/// progressively and the default value is the anonymous viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerProfile {
    pub continent: Option<ContinentId>,
    pub country: Option<CountryId>,
    pub state: Option<StateId>,
    pub town: Option<TownId>,
}

impl ViewerProfile {
    /// A viewer with no profile at all; sees only globally scoped listings.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Both sides must carry a value and agree. A missing value on either side is
/// never a match.
fn level_matches<T: PartialEq + Copy>(listing: Option<T>, viewer: Option<T>) -> bool {
    matches!((listing, viewer), (Some(l), Some(v)) if l == v)
}

/// Whether one placement is visible to one viewer.
pub fn visible_to(placement: &Placement, viewer: &ViewerProfile) -> bool {
    match placement.scope {
        AvailabilityScope::Global => true,
        AvailabilityScope::Continent => level_matches(placement.continent, viewer.continent),
        AvailabilityScope::Country => {
            level_matches(placement.continent, viewer.continent)
                && level_matches(placement.country, viewer.country)
        }
        AvailabilityScope::State => {
            level_matches(placement.continent, viewer.continent)
                && level_matches(placement.country, viewer.country)
                && level_matches(placement.state, viewer.state)
        }
        AvailabilityScope::Town => {
            level_matches(placement.continent, viewer.continent)
                && level_matches(placement.country, viewer.country)
                && level_matches(placement.state, viewer.state)
                && level_matches(placement.town, viewer.town)
        }
    }
}
