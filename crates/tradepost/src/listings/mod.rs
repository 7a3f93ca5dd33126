//! Listing domain, storage seams, the intake service, and the HTTP router.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ApprovalStatus, Listing, ListingDraft, ListingId, ListingKind, PersonId};
pub use repository::{
    ListingRepository, NotifyError, OwnerRef, OwnerStatusStore, RepositoryError, ReviewNotifier,
};
pub use router::listing_router;
pub use service::{visible_listings, ListingService, ListingServiceError, SubmittedListing};
