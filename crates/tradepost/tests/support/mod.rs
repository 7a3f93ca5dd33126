//! Shared fixtures: a seeded directory, recording stores, and a service
//! builder so scenario files exercise the public facade only.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tradepost::geo::scope::{AvailabilityScope, LevelInput, LocationSelection};
use tradepost::geo::{
    Continent, ContinentId, Country, CountryId, InMemoryLocationDirectory,
    InMemoryPendingRequests, State, StateId, Town, TownId, TownKind, TownReview,
};
use tradepost::listings::ListingService;
use tradepost::listings::domain::{
    ApprovalStatus, Listing, ListingDraft, ListingId, ListingKind, PersonId,
};
use tradepost::listings::repository::{
    ListingRepository, NotifyError, OwnerRef, OwnerStatusStore, RepositoryError, ReviewNotifier,
};

/// Africa(1) → Nigeria(10) → Lagos(100) → Ikeja(1000), plus the Ogun sibling
/// state (200) and a European branch for cross-continent checks.
pub fn seeded_directory() -> InMemoryLocationDirectory {
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
        id: StateId(200),
        code: "OG".to_string(),
        name: "Ogun".to_string(),
        country: CountryId(10),
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
        id: TownId(1200),
        code: "PA1200".to_string(),
        name: "Paris".to_string(),
        state: StateId(120),
        kind: TownKind::City,
    });

    directory
}

/// Listing store that also backs the owner-status seam, mirroring the
/// production adapter but with accessors for assertions.
#[derive(Default)]
pub struct TestListings {
    records: Mutex<HashMap<ListingId, Listing>>,
    person_status: Mutex<HashMap<PersonId, ApprovalStatus>>,
    person_town: Mutex<HashMap<PersonId, TownId>>,
}

impl TestListings {
    pub fn person_status(&self, person: PersonId) -> Option<ApprovalStatus> {
        self.person_status
            .lock()
            .expect("person mutex poisoned")
            .get(&person)
            .copied()
    }

    pub fn person_town(&self, person: PersonId) -> Option<TownId> {
        self.person_town
            .lock()
            .expect("person mutex poisoned")
            .get(&person)
            .copied()
    }
}

impl ListingRepository for TestListings {
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

impl OwnerStatusStore for TestListings {
    fn set_status(&self, owner: &OwnerRef, status: ApprovalStatus) -> Result<(), RepositoryError> {
        match owner {
            OwnerRef::Listing(id) => {
                let mut records = self.records.lock().expect("listing mutex poisoned");
                let listing = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
                listing.status = status;
                Ok(())
            }
            OwnerRef::Person(id) => {
                self.person_status
                    .lock()
                    .expect("person mutex poisoned")
                    .insert(*id, status);
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
                self.person_town
                    .lock()
                    .expect("person mutex poisoned")
                    .insert(*id, town);
                Ok(())
            }
        }
    }
}

/// Captures review notifications for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<TownReview>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<TownReview> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReviewNotifier for RecordingNotifier {
    fn notify(&self, review: TownReview) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(review);
        Ok(())
    }
}

pub type TestService = ListingService<
    InMemoryLocationDirectory,
    TestListings,
    InMemoryPendingRequests,
    RecordingNotifier,
>;

pub struct Fixture {
    pub service: Arc<TestService>,
    pub directory: Arc<InMemoryLocationDirectory>,
    pub listings: Arc<TestListings>,
    pub requests: Arc<InMemoryPendingRequests>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn fixture() -> Fixture {
    let directory = Arc::new(seeded_directory());
    let listings = Arc::new(TestListings::default());
    let requests = Arc::new(InMemoryPendingRequests::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(ListingService::new(
        Arc::clone(&directory),
        Arc::clone(&listings),
        Arc::clone(&requests),
        Arc::clone(&notifier),
    ));
    Fixture {
        service,
        directory,
        listings,
        requests,
        notifier,
    }
}

pub fn lagos_selection() -> LocationSelection {
    LocationSelection {
        continent: LevelInput::Chosen(1),
        country: LevelInput::Chosen(10),
        state: LevelInput::Chosen(100),
        town: LevelInput::Unset,
    }
}

pub fn draft(
    title: &str,
    declared_scope: AvailabilityScope,
    location: LocationSelection,
) -> ListingDraft {
    ListingDraft {
        kind: ListingKind::Offer,
        title: title.to_string(),
        body: String::new(),
        author: PersonId(1),
        declared_scope,
        location,
    }
}
