//! Listing intake: scope resolution, placement lookup, the pending-town
//! intercept, and viewer-facing search.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{ApprovalStatus, Listing, ListingDraft, ListingId, PersonId};
use super::repository::{
    ListingRepository, OwnerRef, OwnerStatusStore, RepositoryError, ReviewNotifier,
};
use crate::geo::directory::{DirectoryError, LocationDirectory};
use crate::geo::domain::{ContinentId, CountryId, StateId, Town, TownId};
use crate::geo::pending::{
    LocationReviewQueue, PendingLocationRequest, PendingRequestId, PendingRequestRepository,
    QueueError, ReviewTally,
};
use crate::geo::scope::{resolve_scope, FieldError, LevelInput};
use crate::geo::visibility::{visible_to, Placement, ViewerProfile};

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    /// Every field-level problem from one submission, collected so the author
    /// sees them all in a single round trip.
    #[error("listing validation failed")]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result of a successful submission: the stored listing plus the pending
/// request when the typed town needs review.
#[derive(Debug, Clone)]
pub struct SubmittedListing {
    pub listing: Listing,
    pub pending: Option<PendingLocationRequest>,
}

/// Approved-status gate, scope rules, and defensive dedup in one pass. The
/// OR'd scope rules cannot match a listing twice, but a pathological store
/// could hand us duplicates, so ids are tracked anyway.
pub fn visible_listings(listings: Vec<Listing>, viewer: &ViewerProfile) -> Vec<Listing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| listing.status == ApprovalStatus::Approved)
        .filter(|listing| visible_to(&listing.placement, viewer))
        .filter(|listing| seen.insert(listing.id))
        .collect()
}

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    ListingId(LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Service composing the directory, the listing store, and the review queue.
pub struct ListingService<D, R, P, N> {
    directory: Arc<D>,
    listings: Arc<R>,
    queue: LocationReviewQueue<D, P, R, N>,
}

impl<D, R, P, N> ListingService<D, R, P, N>
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    pub fn new(directory: Arc<D>, listings: Arc<R>, requests: Arc<P>, notifier: Arc<N>) -> Self {
        let queue = LocationReviewQueue::new(
            Arc::clone(&directory),
            requests,
            Arc::clone(&listings),
            notifier,
        );
        Self {
            directory,
            listings,
            queue,
        }
    }

    /// Validate and store a draft.
    ///
    /// All field errors come back together. A typed town that matches an
    /// existing record under the selected state resolves silently; one that
    /// does not parks the listing as pending behind a review request.
    pub fn submit(&self, draft: ListingDraft) -> Result<SubmittedListing, ListingServiceError> {
        let mut errors = Vec::new();

        if draft.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title must not be blank."));
        }

        let effective_scope = match resolve_scope(draft.declared_scope, &draft.location) {
            Ok(scope) => Some(scope),
            Err(err) => {
                errors.push(err);
                None
            }
        };

        let continent = self.resolve_continent(&draft.location.continent, &mut errors)?;
        let country = self.resolve_country(&draft.location.country, &mut errors)?;
        let state = self.resolve_state(&draft.location.state, &mut errors)?;
        let (mut town, typed_town) = self.resolve_town(&draft.location.town, state, &mut errors)?;

        let mut pending_name: Option<String> = None;
        if let Some(typed) = typed_town {
            match self.directory.find_town_by_name(
                state.expect("typed town implies resolved state"),
                &typed,
            )? {
                Some(existing) => town = Some(existing.id),
                None => pending_name = Some(typed),
            }
        }

        if !errors.is_empty() {
            return Err(ListingServiceError::Validation(errors));
        }

        let scope = effective_scope.expect("no errors implies a resolved scope");
        let status = if pending_name.is_some() {
            ApprovalStatus::PendingReview
        } else {
            ApprovalStatus::Approved
        };

        let listing = Listing {
            id: next_listing_id(),
            kind: draft.kind,
            title: draft.title.trim().to_string(),
            body: draft.body,
            author: draft.author,
            placement: Placement {
                scope,
                continent,
                country,
                state,
                town,
            },
            status,
            created_at: Utc::now(),
        };

        let stored = self.listings.insert(listing)?;
        info!(id = stored.id.0, scope = scope.label(), status = status.label(), "listing submitted");

        let pending = match pending_name {
            Some(typed) => Some(self.queue.submit_typed_town(
                OwnerRef::Listing(stored.id),
                &typed,
                stored.placement.state.expect("pending town implies state"),
            )?),
            None => None,
        };

        Ok(SubmittedListing {
            listing: stored,
            pending,
        })
    }

    /// Queue a typed town against a member's own location profile.
    pub fn request_profile_town(
        &self,
        person: PersonId,
        typed_name: &str,
        parent_state: StateId,
    ) -> Result<PendingLocationRequest, ListingServiceError> {
        Ok(self
            .queue
            .submit_typed_town(OwnerRef::Person(person), typed_name, parent_state)?)
    }

    pub fn get(&self, id: ListingId) -> Result<Listing, ListingServiceError> {
        let listing = self.listings.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(listing)
    }

    /// Everything the viewer is allowed to see, with an optional keyword
    /// constraint applied on top of the visibility rules, never instead of
    /// them.
    pub fn search(
        &self,
        viewer: &ViewerProfile,
        keyword: Option<&str>,
    ) -> Result<Vec<Listing>, ListingServiceError> {
        let mut results = visible_listings(self.listings.all()?, viewer);

        if let Some(keyword) = keyword.map(str::trim).filter(|kw| !kw.is_empty()) {
            let needle = keyword.to_lowercase();
            results.retain(|listing| {
                listing.title.to_lowercase().contains(&needle)
                    || listing.body.to_lowercase().contains(&needle)
            });
        }

        Ok(results)
    }

    pub fn review_queue(
        &self,
        limit: usize,
    ) -> Result<Vec<PendingLocationRequest>, ListingServiceError> {
        Ok(self.queue.unreviewed(limit)?)
    }

    pub fn approve_location(&self, id: PendingRequestId) -> Result<Town, ListingServiceError> {
        Ok(self.queue.approve(id)?)
    }

    pub fn approve_locations(
        &self,
        ids: &[PendingRequestId],
    ) -> Result<ReviewTally, ListingServiceError> {
        Ok(self.queue.approve_batch(ids)?)
    }

    pub fn reject_locations(
        &self,
        ids: &[PendingRequestId],
        note: Option<String>,
    ) -> Result<ReviewTally, ListingServiceError> {
        Ok(self.queue.reject_batch(ids, note)?)
    }

    fn resolve_continent(
        &self,
        input: &LevelInput,
        errors: &mut Vec<FieldError>,
    ) -> Result<Option<ContinentId>, ListingServiceError> {
        if !input.is_specified() {
            return Ok(None);
        }
        match input {
            LevelInput::Chosen(raw) => {
                let id = ContinentId(*raw);
                if self.directory.continent(id)?.is_none() {
                    errors.push(FieldError::new("continent", "Unknown continent selected."));
                    return Ok(None);
                }
                Ok(Some(id))
            }
            LevelInput::Typed(_) => {
                errors.push(FieldError::new(
                    "continent",
                    "Select a continent from the list.",
                ));
                Ok(None)
            }
            LevelInput::Unset => Ok(None),
        }
    }

    fn resolve_country(
        &self,
        input: &LevelInput,
        errors: &mut Vec<FieldError>,
    ) -> Result<Option<CountryId>, ListingServiceError> {
        if !input.is_specified() {
            return Ok(None);
        }
        match input {
            LevelInput::Chosen(raw) => {
                let id = CountryId(*raw);
                if self.directory.country(id)?.is_none() {
                    errors.push(FieldError::new("country", "Unknown country selected."));
                    return Ok(None);
                }
                Ok(Some(id))
            }
            LevelInput::Typed(_) => {
                errors.push(FieldError::new("country", "Select a country from the list."));
                Ok(None)
            }
            LevelInput::Unset => Ok(None),
        }
    }

    fn resolve_state(
        &self,
        input: &LevelInput,
        errors: &mut Vec<FieldError>,
    ) -> Result<Option<StateId>, ListingServiceError> {
        if !input.is_specified() {
            return Ok(None);
        }
        match input {
            LevelInput::Chosen(raw) => {
                let id = StateId(*raw);
                if self.directory.state(id)?.is_none() {
                    errors.push(FieldError::new("state", "Unknown state selected."));
                    return Ok(None);
                }
                Ok(Some(id))
            }
            LevelInput::Typed(_) => {
                errors.push(FieldError::new("state", "Select a state from the list."));
                Ok(None)
            }
            LevelInput::Unset => Ok(None),
        }
    }

    /// Returns the resolved town id (dropdown path) or the typed name awaiting
    /// matching/review (free-text path). A typed town without a resolved state
    /// is a field error: the review queue needs the candidate parent.
    fn resolve_town(
        &self,
        input: &LevelInput,
        state: Option<StateId>,
        errors: &mut Vec<FieldError>,
    ) -> Result<(Option<TownId>, Option<String>), ListingServiceError> {
        if !input.is_specified() {
            return Ok((None, None));
        }
        match input {
            LevelInput::Chosen(raw) => {
                let id = TownId(*raw);
                if self.directory.town(id)?.is_none() {
                    errors.push(FieldError::new("town", "Unknown town selected."));
                    return Ok((None, None));
                }
                Ok((Some(id), None))
            }
            LevelInput::Typed(raw) => {
                if state.is_none() {
                    errors.push(FieldError::new(
                        "state",
                        "A typed town needs its state selected from the list.",
                    ));
                    return Ok((None, None));
                }
                Ok((None, Some(raw.trim().to_string())))
            }
            LevelInput::Unset => Ok((None, None)),
        }
    }
}
