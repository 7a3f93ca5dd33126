use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use tradepost::geo::{
    Continent, ContinentId, Country, CountryId, InMemoryLocationDirectory, ReviewDecision, State,
    StateId, Town, TownId, TownKind, TownReview,
};
use tradepost::listings::domain::{ApprovalStatus, Listing, ListingId, PersonId};
use tradepost::listings::repository::{
    ListingRepository, NotifyError, OwnerRef, OwnerStatusStore, RepositoryError, ReviewNotifier,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Listing store doubling as the owner-status seam for the review queue:
/// listing owners are the rows themselves, person owners live in a side map.
#[derive(Default)]
pub(crate) struct InMemoryListings {
    records: Mutex<HashMap<ListingId, Listing>>,
    person_status: Mutex<HashMap<PersonId, ApprovalStatus>>,
    person_town: Mutex<HashMap<PersonId, TownId>>,
}

impl InMemoryListings {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl ListingRepository for InMemoryListings {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        let mut records = self.records.lock().expect("listing mutex poisoned");
        if records.contains_key(&listing.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(listing.id, listing.clone());
        Ok(listing)
    }

    fn update(&self, listing: Listing) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("listing mutex poisoned");
        if records.contains_key(&listing.id) {
            records.insert(listing.id, listing);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        let records = self.records.lock().expect("listing mutex poisoned");
        Ok(records.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        let records = self.records.lock().expect("listing mutex poisoned");
        let mut listings: Vec<_> = records.values().cloned().collect();
        listings.sort_by_key(|listing| listing.id);
        Ok(listings)
    }
}

impl OwnerStatusStore for InMemoryListings {
    fn set_status(&self, owner: &OwnerRef, status: ApprovalStatus) -> Result<(), RepositoryError> {
        match owner {
            OwnerRef::Listing(id) => {
                let mut records = self.records.lock().expect("listing mutex poisoned");
                let listing = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
                listing.status = status;
                Ok(())
            }
            OwnerRef::Person(id) => {
                let mut statuses = self.person_status.lock().expect("person mutex poisoned");
                statuses.insert(*id, status);
                Ok(())
            }
        }
    }

    fn attach_town(&self, owner: &OwnerRef, town: TownId) -> Result<(), RepositoryError> {
        match owner {
            OwnerRef::Listing(id) => {
                let mut records = self.records.lock().expect("listing mutex poisoned");
                let listing = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
                listing.placement.town = Some(town);
                Ok(())
            }
            OwnerRef::Person(id) => {
                let mut towns = self.person_town.lock().expect("person mutex poisoned");
                towns.insert(*id, town);
                Ok(())
            }
        }
    }
}

/// Review decisions are logged; real delivery (mail, in-app) hangs off the
/// same seam in deployment.
#[derive(Default)]
pub(crate) struct LogNotifier;

impl ReviewNotifier for LogNotifier {
    fn notify(&self, review: TownReview) -> Result<(), NotifyError> {
        match review.decision {
            ReviewDecision::Approved => {
                info!(owner = ?review.owner, town = %review.town_name, "location approved")
            }
            ReviewDecision::Rejected => {
                info!(owner = ?review.owner, town = %review.town_name, "location rejected")
            }
        }
        Ok(())
    }
}

/// Small reference dataset so the service is usable out of the box.
pub(crate) fn seed_directory() -> InMemoryLocationDirectory {
    let directory = InMemoryLocationDirectory::new();

    directory.insert_continent(Continent {
        id: ContinentId(1),
        code: "AF".to_string(),
        name: "Africa".to_string(),
    });
    directory.insert_continent(Continent {
        id: ContinentId(2),
        code: "EU".to_string(),
        name: "Europe".to_string(),
    });

    directory.insert_country(Country {
        id: CountryId(10),
        code: "NG".to_string(),
        name: "Nigeria".to_string(),
        continent: ContinentId(1),
    });
    directory.insert_country(Country {
        id: CountryId(11),
        code: "GH".to_string(),
        name: "Ghana".to_string(),
        continent: ContinentId(1),
    });
    directory.insert_country(Country {
        id: CountryId(20),
        code: "FR".to_string(),
        name: "France".to_string(),
        continent: ContinentId(2),
    });

    directory.insert_state(State {
        id: StateId(100),
        code: "LA".to_string(),
        name: "Lagos".to_string(),
        country: CountryId(10),
    });
    directory.insert_state(State {
        id: StateId(101),
        code: "OY".to_string(),
        name: "Oyo".to_string(),
        country: CountryId(10),
    });
    directory.insert_state(State {
        id: StateId(110),
        code: "GA".to_string(),
        name: "Greater Accra".to_string(),
        country: CountryId(11),
    });
    directory.insert_state(State {
        id: StateId(120),
        code: "IDF".to_string(),
        name: "Ile-de-France".to_string(),
        country: CountryId(20),
    });

    directory.insert_town(Town {
        id: TownId(1000),
        code: "IK1000".to_string(),
        name: "Ikeja".to_string(),
        state: StateId(100),
        kind: TownKind::City,
    });
    directory.insert_town(Town {
        id: TownId(1001),
        code: "BA1001".to_string(),
        name: "Badagry".to_string(),
        state: StateId(100),
        kind: TownKind::Town,
    });
    directory.insert_town(Town {
        id: TownId(1010),
        code: "IB1010".to_string(),
        name: "Ibadan".to_string(),
        state: StateId(101),
        kind: TownKind::City,
    });
    directory.insert_town(Town {
        id: TownId(1200),
        code: "PA1200".to_string(),
        name: "Paris".to_string(),
        state: StateId(120),
        kind: TownKind::City,
    });

    directory
}
