//! Read-mostly store for the location hierarchy.
//!
//! Writes happen on two paths only: bulk seeding at startup and town minting
//! during pending-request approval. Minting reads the current maximum town id
//! and inserts the successor, so `find_or_create_town` must be a single
//! serialized step on every implementation; two concurrent approvals may never
//! mint the same id.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

use super::domain::{
    normalize_town_name, Continent, ContinentId, Country, CountryId, State, StateId, Town, TownId,
    TownKind,
};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("location not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup seam over the hierarchy so the review queue and listing service can
/// be exercised against fixtures.
pub trait LocationDirectory: Send + Sync {
    fn continent(&self, id: ContinentId) -> Result<Option<Continent>, DirectoryError>;
    fn country(&self, id: CountryId) -> Result<Option<Country>, DirectoryError>;
    fn state(&self, id: StateId) -> Result<Option<State>, DirectoryError>;
    fn town(&self, id: TownId) -> Result<Option<Town>, DirectoryError>;

    fn towns_in_state(&self, state: StateId) -> Result<Vec<Town>, DirectoryError>;

    /// Case-insensitive exact name match within one state. Names are only
    /// unique per state; the same name under two states is two towns.
    fn find_town_by_name(&self, state: StateId, name: &str)
        -> Result<Option<Town>, DirectoryError>;

    /// Reuse a matching town under `state` or mint a new one atomically.
    ///
    /// Minting assigns `max existing id + 1` and derives the short code from
    /// the first two characters of the normalized name plus the id.
    fn find_or_create_town(
        &self,
        state: StateId,
        name: &str,
        kind: TownKind,
    ) -> Result<Town, DirectoryError>;
}

#[derive(Default)]
struct DirectoryInner {
    continents: BTreeMap<ContinentId, Continent>,
    countries: BTreeMap<CountryId, Country>,
    states: BTreeMap<StateId, State>,
    towns: BTreeMap<TownId, Town>,
}

/// Mutex-backed directory; the lock is what serializes town minting.
#[derive(Default)]
pub struct InMemoryLocationDirectory {
    inner: Mutex<DirectoryInner>,
}

impl InMemoryLocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_continent(&self, continent: Continent) {
        let mut inner = self.inner.lock().expect("directory mutex poisoned");
        inner.continents.insert(continent.id, continent);
    }

    pub fn insert_country(&self, country: Country) {
        let mut inner = self.inner.lock().expect("directory mutex poisoned");
        inner.countries.insert(country.id, country);
    }

    pub fn insert_state(&self, state: State) {
        let mut inner = self.inner.lock().expect("directory mutex poisoned");
        inner.states.insert(state.id, state);
    }

    pub fn insert_town(&self, town: Town) {
        let mut inner = self.inner.lock().expect("directory mutex poisoned");
        inner.towns.insert(town.id, town);
    }
}

fn town_code(name: &str, id: TownId) -> String {
    let prefix: String = name.chars().take(2).collect::<String>().to_uppercase();
    format!("{prefix}{}", id.0)
}

impl LocationDirectory for InMemoryLocationDirectory {
    fn continent(&self, id: ContinentId) -> Result<Option<Continent>, DirectoryError> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        Ok(inner.continents.get(&id).cloned())
    }

    fn country(&self, id: CountryId) -> Result<Option<Country>, DirectoryError> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        Ok(inner.countries.get(&id).cloned())
    }

    fn state(&self, id: StateId) -> Result<Option<State>, DirectoryError> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        Ok(inner.states.get(&id).cloned())
    }

    fn town(&self, id: TownId) -> Result<Option<Town>, DirectoryError> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        Ok(inner.towns.get(&id).cloned())
    }

    fn towns_in_state(&self, state: StateId) -> Result<Vec<Town>, DirectoryError> {
        let inner = self.inner.lock().expect("directory mutex poisoned");
        Ok(inner
            .towns
            .values()
            .filter(|town| town.state == state)
            .cloned()
            .collect())
    }

    fn find_town_by_name(
        &self,
        state: StateId,
        name: &str,
    ) -> Result<Option<Town>, DirectoryError> {
        let needle = name.trim();
        let inner = self.inner.lock().expect("directory mutex poisoned");
        Ok(inner
            .towns
            .values()
            .find(|town| town.state == state && town.name.eq_ignore_ascii_case(needle))
            .cloned())
    }

    fn find_or_create_town(
        &self,
        state: StateId,
        name: &str,
        kind: TownKind,
    ) -> Result<Town, DirectoryError> {
        let normalized = normalize_town_name(name);
        let mut inner = self.inner.lock().expect("directory mutex poisoned");

        if !inner.states.contains_key(&state) {
            return Err(DirectoryError::NotFound);
        }

        if let Some(existing) = inner
            .towns
            .values()
            .find(|town| town.state == state && town.name.eq_ignore_ascii_case(&normalized))
        {
            return Ok(existing.clone());
        }

        let next_id = TownId(
            inner
                .towns
                .keys()
                .next_back()
                .map(|id| id.0 + 1)
                .unwrap_or(1),
        );
        let town = Town {
            id: next_id,
            code: town_code(&normalized, next_id),
            name: normalized,
            state,
            kind,
        };
        inner.towns.insert(town.id, town.clone());
        Ok(town)
    }
}
