//! Pending town requests and their review lifecycle.
//!
//! When an author types a town the directory cannot match, the owning entity
//! is parked as pending and a durable request records the raw text plus the
//! candidate parent state. A reviewer later approves (the town is found or
//! minted in the shared directory and linked back) or rejects (the owner goes
//! back to the submitter for correction, its previous location data intact).
//! One live request per owner: resubmission updates in place.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::directory::{DirectoryError, LocationDirectory};
use super::domain::{StateId, Town, TownKind};
use crate::listings::domain::ApprovalStatus;
use crate::listings::repository::{
    NotifyError, OwnerRef, OwnerStatusStore, RepositoryError, ReviewNotifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PendingRequestId(pub u64);

/// Review lifecycle of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Unreviewed,
    Approved,
    Rejected,
}

impl ReviewState {
    pub fn label(self) -> &'static str {
        match self {
            ReviewState::Unreviewed => "unreviewed",
            ReviewState::Approved => "approved",
            ReviewState::Rejected => "rejected",
        }
    }
}

/// A free-typed town awaiting administrative review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLocationRequest {
    pub id: PendingRequestId,
    pub owner: OwnerRef,
    pub typed_name: String,
    pub parent_state: Option<StateId>,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_note: Option<String>,
}

/// Storage seam for pending requests. `upsert` is keyed by owner so the
/// one-live-request-per-owner rule holds for any backing store.
pub trait PendingRequestRepository: Send + Sync {
    fn upsert(
        &self,
        request: PendingLocationRequest,
    ) -> Result<PendingLocationRequest, RepositoryError>;
    fn fetch(&self, id: PendingRequestId)
        -> Result<Option<PendingLocationRequest>, RepositoryError>;
    fn fetch_for_owner(
        &self,
        owner: &OwnerRef,
    ) -> Result<Option<PendingLocationRequest>, RepositoryError>;
    fn update(&self, request: PendingLocationRequest) -> Result<(), RepositoryError>;
    fn unreviewed(&self, limit: usize) -> Result<Vec<PendingLocationRequest>, RepositoryError>;
}

/// Mutex-backed request store used by the API service and fixtures.
#[derive(Default)]
pub struct InMemoryPendingRequests {
    records: Mutex<HashMap<PendingRequestId, PendingLocationRequest>>,
}

impl InMemoryPendingRequests {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingRequestRepository for InMemoryPendingRequests {
    fn upsert(
        &self,
        request: PendingLocationRequest,
    ) -> Result<PendingLocationRequest, RepositoryError> {
        let mut records = self.records.lock().expect("request mutex poisoned");
        records.insert(request.id, request.clone());
        Ok(request)
    }

    fn fetch(
        &self,
        id: PendingRequestId,
    ) -> Result<Option<PendingLocationRequest>, RepositoryError> {
        let records = self.records.lock().expect("request mutex poisoned");
        Ok(records.get(&id).cloned())
    }

    fn fetch_for_owner(
        &self,
        owner: &OwnerRef,
    ) -> Result<Option<PendingLocationRequest>, RepositoryError> {
        let records = self.records.lock().expect("request mutex poisoned");
        Ok(records.values().find(|req| &req.owner == owner).cloned())
    }

    fn update(&self, request: PendingLocationRequest) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("request mutex poisoned");
        if records.contains_key(&request.id) {
            records.insert(request.id, request);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn unreviewed(&self, limit: usize) -> Result<Vec<PendingLocationRequest>, RepositoryError> {
        let records = self.records.lock().expect("request mutex poisoned");
        let mut unreviewed: Vec<_> = records
            .values()
            .filter(|req| req.state == ReviewState::Unreviewed)
            .cloned()
            .collect();
        unreviewed.sort_by_key(|req| req.id);
        unreviewed.truncate(limit);
        Ok(unreviewed)
    }
}

/// Outcome of one review decision, handed back to callers and to the
/// notification seam instead of flags smuggled on the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownReview {
    pub owner: OwnerRef,
    pub town_name: String,
    pub decision: ReviewDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// Aggregate counts returned by bulk review actions. A skipped row stays
/// unreviewed; bad rows never abort the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTally {
    pub approved: usize,
    pub rejected: usize,
    pub skipped: usize,
}

/// Error raised by queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("typed town name is blank")]
    BlankName,
    #[error("request has no parent state")]
    MissingState,
    #[error("parent state {0} not found")]
    UnknownState(u32),
    #[error("pending request not found")]
    RequestNotFound,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> PendingRequestId {
    PendingRequestId(REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Service composing the directory, the request store, the owner-status seam,
/// and the notifier.
pub struct LocationReviewQueue<D, P, S, N> {
    directory: Arc<D>,
    requests: Arc<P>,
    owners: Arc<S>,
    notifier: Arc<N>,
}

impl<D, P, S, N> LocationReviewQueue<D, P, S, N>
where
    D: LocationDirectory + 'static,
    P: PendingRequestRepository + 'static,
    S: OwnerStatusStore + 'static,
    N: ReviewNotifier + 'static,
{
    pub fn new(directory: Arc<D>, requests: Arc<P>, owners: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            directory,
            requests,
            owners,
            notifier,
        }
    }

    /// Park `owner` behind a pending request for `typed_name` under
    /// `parent_state`. Resubmission replaces the typed name on the existing
    /// request rather than creating a second row.
    pub fn submit_typed_town(
        &self,
        owner: OwnerRef,
        typed_name: &str,
        parent_state: StateId,
    ) -> Result<PendingLocationRequest, QueueError> {
        let trimmed = typed_name.trim();
        if trimmed.is_empty() {
            return Err(QueueError::BlankName);
        }
        if self.directory.state(parent_state)?.is_none() {
            return Err(QueueError::UnknownState(parent_state.0));
        }

        let request = match self.requests.fetch_for_owner(&owner)? {
            Some(mut existing) => {
                existing.typed_name = trimmed.to_string();
                existing.parent_state = Some(parent_state);
                existing.state = ReviewState::Unreviewed;
                existing.reviewed_at = None;
                existing.reviewer_note = None;
                existing
            }
            None => PendingLocationRequest {
                id: next_request_id(),
                owner,
                typed_name: trimmed.to_string(),
                parent_state: Some(parent_state),
                state: ReviewState::Unreviewed,
                submitted_at: Utc::now(),
                reviewed_at: None,
                reviewer_note: None,
            },
        };

        let stored = self.requests.upsert(request)?;
        self.owners
            .set_status(&owner, ApprovalStatus::PendingReview)?;
        Ok(stored)
    }

    /// Approve one request: find or mint the town under the parent state, link
    /// it to the owner, and mark both approved. Returns the town so callers
    /// can surface it.
    pub fn approve(&self, id: PendingRequestId) -> Result<Town, QueueError> {
        let mut request = self.requests.fetch(id)?.ok_or(QueueError::RequestNotFound)?;

        if request.typed_name.trim().is_empty() {
            return Err(QueueError::BlankName);
        }
        let parent_state = request
            .parent_state
            .ok_or(QueueError::MissingState)
            .and_then(|state| match self.directory.state(state)? {
                Some(_) => Ok(state),
                None => Err(QueueError::UnknownState(state.0)),
            })?;

        let town =
            self.directory
                .find_or_create_town(parent_state, &request.typed_name, TownKind::Town)?;

        self.owners.attach_town(&request.owner, town.id)?;
        self.owners
            .set_status(&request.owner, ApprovalStatus::Approved)?;

        request.state = ReviewState::Approved;
        request.reviewed_at = Some(Utc::now());
        self.requests.update(request.clone())?;

        info!(town = %town.name, owner = ?request.owner, "pending town approved");
        self.notifier.notify(TownReview {
            owner: request.owner,
            town_name: town.name.clone(),
            decision: ReviewDecision::Approved,
        })?;

        Ok(town)
    }

    /// Reject one request: the owner keeps its previous location data and goes
    /// back to the submitter for correction. The owner-status write happens
    /// before the request row is marked, so a vanished owner leaves the row
    /// unreviewed.
    pub fn reject(&self, id: PendingRequestId, note: Option<String>) -> Result<(), QueueError> {
        let mut request = self.requests.fetch(id)?.ok_or(QueueError::RequestNotFound)?;

        self.owners
            .set_status(&request.owner, ApprovalStatus::AwaitingCorrection)?;

        request.state = ReviewState::Rejected;
        request.reviewed_at = Some(Utc::now());
        request.reviewer_note = note;
        self.requests.update(request.clone())?;

        info!(typed = %request.typed_name, owner = ?request.owner, "pending town rejected");
        self.notifier.notify(TownReview {
            owner: request.owner,
            town_name: request.typed_name.clone(),
            decision: ReviewDecision::Rejected,
        })?;

        Ok(())
    }

    /// Approve a batch. Rows with a blank name, a missing or unknown parent
    /// state, an unknown id, or an owner that no longer exists are counted as
    /// skipped and left unreviewed; a backend reporting itself unavailable
    /// still aborts.
    pub fn approve_batch(&self, ids: &[PendingRequestId]) -> Result<ReviewTally, QueueError> {
        let mut tally = ReviewTally::default();
        for &id in ids {
            match self.approve(id) {
                Ok(_) => tally.approved += 1,
                Err(
                    QueueError::BlankName
                    | QueueError::MissingState
                    | QueueError::UnknownState(_)
                    | QueueError::RequestNotFound
                    | QueueError::Directory(DirectoryError::NotFound)
                    | QueueError::Repository(RepositoryError::NotFound),
                ) => tally.skipped += 1,
                Err(other) => return Err(other),
            }
        }
        Ok(tally)
    }

    /// Reject a batch; unknown ids and vanished owners are skipped.
    pub fn reject_batch(
        &self,
        ids: &[PendingRequestId],
        note: Option<String>,
    ) -> Result<ReviewTally, QueueError> {
        let mut tally = ReviewTally::default();
        for &id in ids {
            match self.reject(id, note.clone()) {
                Ok(()) => tally.rejected += 1,
                Err(
                    QueueError::RequestNotFound
                    | QueueError::Repository(RepositoryError::NotFound),
                ) => tally.skipped += 1,
                Err(other) => return Err(other),
            }
        }
        Ok(tally)
    }

    /// Unreviewed requests for the moderation queue view.
    pub fn unreviewed(&self, limit: usize) -> Result<Vec<PendingLocationRequest>, QueueError> {
        Ok(self.requests.unreviewed(limit)?)
    }
}
