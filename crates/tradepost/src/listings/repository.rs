use serde::{Deserialize, Serialize};

use super::domain::{ApprovalStatus, Listing, ListingId, PersonId};
use crate::geo::domain::TownId;

/// Error enumeration for storage failures, shared by the listing store and the
/// pending-request store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction so the intake service can be exercised in isolation.
pub trait ListingRepository: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError>;
    fn update(&self, listing: Listing) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;
    fn all(&self) -> Result<Vec<Listing>, RepositoryError>;
}

/// The entity a pending location request belongs to: a member's own location
/// profile or a specific listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum OwnerRef {
    Person(PersonId),
    Listing(ListingId),
}

/// Review-side mutations on request owners. The queue drives owner status and
/// town linkage through this seam without knowing the owner's shape.
pub trait OwnerStatusStore: Send + Sync {
    fn set_status(&self, owner: &OwnerRef, status: ApprovalStatus) -> Result<(), RepositoryError>;

    /// Link the approved town to the owner's location fields. The town itself
    /// lives in the shared directory; the owner only holds the reference.
    fn attach_town(&self, owner: &OwnerRef, town: TownId) -> Result<(), RepositoryError>;
}

/// Outbound notification seam invoked after a review decision. Delivery
/// mechanics (mail, in-app) live behind the implementation.
pub trait ReviewNotifier: Send + Sync {
    fn notify(&self, review: crate::geo::pending::TownReview) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
