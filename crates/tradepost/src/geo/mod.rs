//! Location hierarchy, availability-scope resolution, pending town review, and
//! the visibility rules that decide which listings a viewer can see.

pub mod directory;
pub mod domain;
pub mod pending;
pub mod scope;
pub mod visibility;

pub use directory::{DirectoryError, InMemoryLocationDirectory, LocationDirectory};
pub use domain::{
    Continent, ContinentId, Country, CountryId, LocationLevel, State, StateId, Town, TownId,
    TownKind,
};
pub use pending::{
    InMemoryPendingRequests, LocationReviewQueue, PendingLocationRequest, PendingRequestId,
    PendingRequestRepository, QueueError, ReviewDecision, ReviewState, ReviewTally, TownReview,
};
pub use scope::{resolve_scope, AvailabilityScope, FieldError, LevelInput, LocationSelection};
pub use visibility::{visible_to, Placement, ViewerProfile};
