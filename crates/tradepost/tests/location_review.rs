//! Review lifecycle scenarios: idempotent submission, approval with reuse or
//! minting, rejection, and skip-not-crash batch semantics.

mod support;

use support::{draft, fixture, lagos_selection};

use tradepost::geo::LocationDirectory;
use tradepost::geo::pending::PendingRequestRepository;
use tradepost::geo::scope::{AvailabilityScope, LevelInput, LocationSelection};
use tradepost::geo::{
    PendingLocationRequest, PendingRequestId, ReviewDecision, ReviewState, StateId, TownId,
};
use tradepost::listings::domain::{ApprovalStatus, ListingId, PersonId};
use tradepost::listings::repository::OwnerRef;

fn typed_town_draft(title: &str, town: &str) -> tradepost::listings::domain::ListingDraft {
    draft(
        title,
        AvailabilityScope::Town,
        LocationSelection {
            town: LevelInput::Typed(town.to_string()),
            ..lagos_selection()
        },
    )
}

#[test]
fn approval_mints_town_and_activates_listing() {
    let fx = fixture();
    let submitted = fx
        .service
        .submit(typed_town_draft("Okada delivery", "epe"))
        .expect("submission succeeds");
    let pending = submitted.pending.expect("pending request");

    let town = fx.service.approve_location(pending.id).expect("approval");
    assert_eq!(town.name, "Epe");
    assert_eq!(town.state, StateId(100));
    // Ikeja(1000) and Paris(1200) are seeded; minting takes the successor id.
    assert_eq!(town.id, TownId(1201));
    assert_eq!(town.code, "EP1201");

    let listing = fx.service.get(submitted.listing.id).expect("listing");
    assert_eq!(listing.status, ApprovalStatus::Approved);
    assert_eq!(listing.placement.town, Some(town.id));

    let events = fx.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].decision, ReviewDecision::Approved);
    assert_eq!(events[0].town_name, "Epe");
    assert_eq!(events[0].owner, OwnerRef::Listing(submitted.listing.id));

    let request = fx
        .requests
        .fetch(pending.id)
        .expect("fetch")
        .expect("request kept");
    assert_eq!(request.state, ReviewState::Approved);
    assert!(request.reviewed_at.is_some());
}

#[test]
fn approval_reuses_existing_town_case_insensitively() {
    let fx = fixture();
    // Bypass the intake-side name match by replacing the typed name after
    // submission, the way a reviewer sees drifted input.
    let submitted = fx
        .service
        .submit(typed_town_draft("Tailoring", "Epe"))
        .expect("submission succeeds");
    let mut pending = submitted.pending.expect("pending request");
    pending.typed_name = "ikeja".to_string();
    fx.requests.update(pending.clone()).expect("update");

    let town = fx.service.approve_location(pending.id).expect("approval");
    assert_eq!(town.id, TownId(1000), "existing Ikeja reused, not duplicated");

    let towns = fx
        .directory
        .towns_in_state(StateId(100))
        .expect("towns list");
    assert_eq!(towns.len(), 1);
}

#[test]
fn rejection_returns_owner_for_correction_without_touching_placement() {
    let fx = fixture();
    let submitted = fx
        .service
        .submit(typed_town_draft("Catering", "Epe"))
        .expect("submission succeeds");
    let pending = submitted.pending.expect("pending request");
    let placement_before = submitted.listing.placement.clone();

    fx.service
        .reject_locations(&[pending.id], Some("cannot verify".to_string()))
        .expect("rejection");

    let listing = fx.service.get(submitted.listing.id).expect("listing");
    assert_eq!(listing.status, ApprovalStatus::AwaitingCorrection);
    assert_eq!(listing.placement, placement_before);

    let request = fx
        .requests
        .fetch(pending.id)
        .expect("fetch")
        .expect("request kept");
    assert_eq!(request.state, ReviewState::Rejected);
    assert_eq!(request.reviewer_note.as_deref(), Some("cannot verify"));

    let events = fx.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].decision, ReviewDecision::Rejected);
    assert_eq!(events[0].town_name, "Epe");
}

#[test]
fn resubmission_updates_the_single_request_in_place() {
    let fx = fixture();
    let person = PersonId(7);

    let first = fx
        .service
        .request_profile_town(person, "Epe", StateId(100))
        .expect("first submission");
    let second = fx
        .service
        .request_profile_town(person, "Badagry", StateId(100))
        .expect("second submission");

    assert_eq!(first.id, second.id, "same row updated, not duplicated");
    assert_eq!(second.typed_name, "Badagry");

    let stored = fx
        .requests
        .fetch_for_owner(&OwnerRef::Person(person))
        .expect("fetch")
        .expect("one request");
    assert_eq!(stored.typed_name, "Badagry");
    assert_eq!(
        fx.requests.unreviewed(10).expect("unreviewed").len(),
        1,
        "exactly one live request for the owner"
    );
    assert_eq!(
        fx.listings.person_status(person),
        Some(ApprovalStatus::PendingReview)
    );
}

#[test]
fn person_approval_links_town_to_profile() {
    let fx = fixture();
    let person = PersonId(9);
    let request = fx
        .service
        .request_profile_town(person, "epe", StateId(100))
        .expect("submission");

    let town = fx.service.approve_location(request.id).expect("approval");
    assert_eq!(fx.listings.person_town(person), Some(town.id));
    assert_eq!(
        fx.listings.person_status(person),
        Some(ApprovalStatus::Approved)
    );
}

#[test]
fn batch_approval_skips_bad_rows_and_processes_the_rest() {
    let fx = fixture();

    let good = fx
        .service
        .submit(typed_town_draft("Okada delivery", "Epe"))
        .expect("submission")
        .pending
        .expect("pending request");

    // A request that lost its parent state; bulk approval must not crash on it.
    let orphan = PendingLocationRequest {
        parent_state: None,
        ..fx.service
            .request_profile_town(PersonId(3), "Nowhere", StateId(100))
            .expect("submission")
    };
    fx.requests.update(orphan.clone()).expect("update");

    let missing = PendingRequestId(424242);

    let tally = fx
        .service
        .approve_locations(&[good.id, orphan.id, missing])
        .expect("batch never aborts");
    assert_eq!(tally.approved, 1);
    assert_eq!(tally.skipped, 2);
    assert_eq!(tally.rejected, 0);

    // Skipped rows stay unreviewed for manual resubmission.
    let still_unreviewed = fx
        .requests
        .fetch(orphan.id)
        .expect("fetch")
        .expect("request kept");
    assert_eq!(still_unreviewed.state, ReviewState::Unreviewed);
}

#[test]
fn batch_approval_skips_requests_whose_owner_is_gone() {
    let fx = fixture();

    // Owner row vanished between submission and review; the bad row must not
    // block the valid one behind it.
    let ghost = PendingLocationRequest {
        owner: OwnerRef::Listing(ListingId(999)),
        ..fx.service
            .request_profile_town(PersonId(4), "Ghost Town", StateId(100))
            .expect("submission")
    };
    fx.requests.update(ghost.clone()).expect("update");

    let good = fx
        .service
        .submit(typed_town_draft("Okada delivery", "Epe"))
        .expect("submission")
        .pending
        .expect("pending request");

    let tally = fx
        .service
        .approve_locations(&[ghost.id, good.id])
        .expect("batch never aborts");
    assert_eq!(tally.approved, 1);
    assert_eq!(tally.skipped, 1);

    let untouched = fx
        .requests
        .fetch(ghost.id)
        .expect("fetch")
        .expect("request kept");
    assert_eq!(untouched.state, ReviewState::Unreviewed);
}

#[test]
fn batch_rejection_skips_requests_whose_owner_is_gone() {
    let fx = fixture();

    let ghost = PendingLocationRequest {
        owner: OwnerRef::Listing(ListingId(999)),
        ..fx.service
            .request_profile_town(PersonId(5), "Nowhere", StateId(100))
            .expect("submission")
    };
    fx.requests.update(ghost.clone()).expect("update");

    let good = fx
        .service
        .submit(typed_town_draft("Catering", "Epe"))
        .expect("submission")
        .pending
        .expect("pending request");

    let tally = fx
        .service
        .reject_locations(&[ghost.id, good.id], None)
        .expect("batch never aborts");
    assert_eq!(tally.rejected, 1);
    assert_eq!(tally.skipped, 1);

    let untouched = fx
        .requests
        .fetch(ghost.id)
        .expect("fetch")
        .expect("request kept");
    assert_eq!(untouched.state, ReviewState::Unreviewed);
}

#[test]
fn batch_rejection_counts_unknown_ids_as_skipped() {
    let fx = fixture();
    let pending = fx
        .service
        .submit(typed_town_draft("Catering", "Epe"))
        .expect("submission")
        .pending
        .expect("pending request");

    let tally = fx
        .service
        .reject_locations(&[pending.id, PendingRequestId(999999)], None)
        .expect("batch never aborts");
    assert_eq!(tally.rejected, 1);
    assert_eq!(tally.skipped, 1);
}

mod http {
    use super::support::fixture;
    use super::typed_town_draft;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tradepost::listings::listing_router;

    #[tokio::test]
    async fn moderation_endpoints_list_and_approve() {
        let fx = fixture();
        let pending = fx
            .service
            .submit(typed_town_draft("Okada delivery", "Epe"))
            .expect("submission")
            .pending
            .expect("pending request");

        let router = listing_router(fx.service.clone());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/moderation/locations")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        let requests = payload
            .get("requests")
            .and_then(Value::as_array)
            .expect("requests array");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].get("typed_name"), Some(&json!("Epe")));

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/moderation/locations/approve")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "ids": [pending.id.0] }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let tally: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(tally.get("approved"), Some(&json!(1)));
        assert_eq!(tally.get("skipped"), Some(&json!(0)));
    }
}
