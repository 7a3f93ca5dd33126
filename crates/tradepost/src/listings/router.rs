//! HTTP surface for listing intake, search, and location moderation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Listing, ListingDraft, ListingId, ListingKind, PersonId};
use super::repository::{ListingRepository, OwnerStatusStore, RepositoryError, ReviewNotifier};
use super::service::{ListingService, ListingServiceError};
use crate::geo::directory::LocationDirectory;
use crate::geo::domain::{ContinentId, CountryId, StateId, TownId};
use crate::geo::pending::{
    PendingLocationRequest, PendingRequestId, PendingRequestRepository, QueueError,
};
use crate::geo::scope::{AvailabilityScope, LevelInput, LocationSelection};
use crate::geo::visibility::ViewerProfile;

#[derive(Debug, Deserialize)]
pub struct SubmitListingRequest {
    pub kind: ListingKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub author: u64,
    pub scope: AvailabilityScope,
    #[serde(default)]
    pub continent: Option<u32>,
    #[serde(default)]
    pub country: Option<u32>,
    #[serde(default)]
    pub state: Option<u32>,
    #[serde(default)]
    pub town: Option<u32>,
    /// Free-typed town name, used when no dropdown town was picked.
    #[serde(default)]
    pub town_name: Option<String>,
}

fn level_from(id: Option<u32>) -> LevelInput {
    match id {
        Some(value) => LevelInput::Chosen(value),
        None => LevelInput::Unset,
    }
}

impl SubmitListingRequest {
    fn into_draft(self) -> ListingDraft {
        let town = match (self.town, self.town_name) {
            (Some(id), _) => LevelInput::Chosen(id),
            (None, Some(name)) => LevelInput::Typed(name),
            (None, None) => LevelInput::Unset,
        };
        ListingDraft {
            kind: self.kind,
            title: self.title,
            body: self.body,
            author: PersonId(self.author),
            declared_scope: self.scope,
            location: LocationSelection {
                continent: level_from(self.continent),
                country: level_from(self.country),
                state: level_from(self.state),
                town,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingView {
    pub id: u64,
    pub kind: &'static str,
    pub title: String,
    pub body: String,
    pub author: u64,
    pub status: &'static str,
    pub scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl ListingView {
    fn from_listing(listing: Listing) -> Self {
        Self {
            id: listing.id.0,
            kind: listing.kind.label(),
            title: listing.title,
            body: listing.body,
            author: listing.author.0,
            status: listing.status.label(),
            scope: listing.placement.scope.label(),
            continent: listing.placement.continent.map(|ContinentId(id)| id),
            country: listing.placement.country.map(|CountryId(id)| id),
            state: listing.placement.state.map(|StateId(id)| id),
            town: listing.placement.town.map(|TownId(id)| id),
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PendingRequestView {
    pub id: u64,
    pub owner: super::repository::OwnerRef,
    pub typed_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_state: Option<u32>,
    pub state: &'static str,
    pub submitted_at: DateTime<Utc>,
}

impl PendingRequestView {
    fn from_request(request: PendingLocationRequest) -> Self {
        Self {
            id: request.id.0,
            owner: request.owner,
            typed_name: request.typed_name,
            parent_state: request.parent_state.map(|StateId(id)| id),
            state: request.state.label(),
            submitted_at: request.submitted_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub continent: Option<u32>,
    #[serde(default)]
    pub country: Option<u32>,
    #[serde(default)]
    pub state: Option<u32>,
    #[serde(default)]
    pub town: Option<u32>,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl SearchRequest {
    fn viewer(&self) -> ViewerProfile {
        ViewerProfile {
            continent: self.continent.map(ContinentId),
            country: self.country.map(CountryId),
            state: self.state.map(StateId),
            town: self.town.map(TownId),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub ids: Vec<u64>,
    #[serde(default)]
    pub note: Option<String>,
}

fn error_response(err: ListingServiceError) -> Response {
    match err {
        ListingServiceError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response(),
        ListingServiceError::Repository(RepositoryError::NotFound)
        | ListingServiceError::Queue(QueueError::RequestNotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not found" })),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

/// Router builder exposing intake, search, and moderation endpoints.
pub fn listing_router<D, R, P, N>(service: Arc<ListingService<D, R, P, N>>) -> Router
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    Router::new()
        .route("/api/v1/listings", post(submit_handler::<D, R, P, N>))
        .route(
            "/api/v1/listings/:listing_id",
            get(get_handler::<D, R, P, N>),
        )
        .route(
            "/api/v1/listings/search",
            post(search_handler::<D, R, P, N>),
        )
        .route(
            "/api/v1/moderation/locations",
            get(queue_handler::<D, R, P, N>),
        )
        .route(
            "/api/v1/moderation/locations/approve",
            post(approve_handler::<D, R, P, N>),
        )
        .route(
            "/api/v1/moderation/locations/reject",
            post(reject_handler::<D, R, P, N>),
        )
        .with_state(service)
}

async fn submit_handler<D, R, P, N>(
    State(service): State<Arc<ListingService<D, R, P, N>>>,
    Json(payload): Json<SubmitListingRequest>,
) -> Response
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.submit(payload.into_draft()) {
        Ok(submitted) => {
            let pending = submitted.pending.map(|request| request.id.0);
            let view = ListingView::from_listing(submitted.listing);
            (
                StatusCode::CREATED,
                Json(json!({ "listing": view, "pending_request": pending })),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn get_handler<D, R, P, N>(
    State(service): State<Arc<ListingService<D, R, P, N>>>,
    Path(listing_id): Path<u64>,
) -> Response
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.get(ListingId(listing_id)) {
        Ok(listing) => Json(ListingView::from_listing(listing)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn search_handler<D, R, P, N>(
    State(service): State<Arc<ListingService<D, R, P, N>>>,
    Json(payload): Json<SearchRequest>,
) -> Response
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let viewer = payload.viewer();
    match service.search(&viewer, payload.keyword.as_deref()) {
        Ok(listings) => {
            let views: Vec<ListingView> =
                listings.into_iter().map(ListingView::from_listing).collect();
            Json(json!({ "listings": views })).into_response()
        }
        Err(err) => error_response(err),
    }
}

const MODERATION_PAGE: usize = 50;

async fn queue_handler<D, R, P, N>(
    State(service): State<Arc<ListingService<D, R, P, N>>>,
) -> Response
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.review_queue(MODERATION_PAGE) {
        Ok(requests) => {
            let views: Vec<PendingRequestView> = requests
                .into_iter()
                .map(PendingRequestView::from_request)
                .collect();
            Json(json!({ "requests": views })).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn approve_handler<D, R, P, N>(
    State(service): State<Arc<ListingService<D, R, P, N>>>,
    Json(payload): Json<ReviewRequest>,
) -> Response
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let ids: Vec<PendingRequestId> = payload.ids.iter().copied().map(PendingRequestId).collect();
    match service.approve_locations(&ids) {
        Ok(tally) => Json(tally).into_response(),
        Err(err) => error_response(err),
    }
}

async fn reject_handler<D, R, P, N>(
    State(service): State<Arc<ListingService<D, R, P, N>>>,
    Json(payload): Json<ReviewRequest>,
) -> Response
where
    D: LocationDirectory + 'static,
    R: ListingRepository + OwnerStatusStore + 'static,
    P: PendingRequestRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let ids: Vec<PendingRequestId> = payload.ids.iter().copied().map(PendingRequestId).collect();
    match service.reject_locations(&ids, payload.note) {
        Ok(tally) => Json(tally).into_response(),
        Err(err) => error_response(err),
    }
}
