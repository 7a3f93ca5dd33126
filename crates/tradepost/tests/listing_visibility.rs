//! Visibility scenarios through the public search surface: the global
//! guarantee, nested ancestor equality, keyword composition, and the
//! approved-status gate.

mod support;

use support::{draft, fixture, lagos_selection, Fixture};

use tradepost::geo::scope::{AvailabilityScope, LevelInput, LocationSelection};
use tradepost::geo::{ContinentId, CountryId, StateId, TownId, ViewerProfile};
use tradepost::listings::domain::ListingId;

fn lagos_viewer() -> ViewerProfile {
    ViewerProfile {
        continent: Some(ContinentId(1)),
        country: Some(CountryId(10)),
        state: Some(StateId(100)),
        town: Some(TownId(1000)),
    }
}

/// One listing per scope, all rooted in Lagos/Ikeja.
fn seed_listings(fx: &Fixture) -> Vec<ListingId> {
    let drafts = vec![
        draft("Global shipping", AvailabilityScope::Global, LocationSelection::empty()),
        draft(
            "Continent-wide imports",
            AvailabilityScope::Continent,
            LocationSelection {
                continent: LevelInput::Chosen(1),
                country: LevelInput::Unset,
                state: LevelInput::Unset,
                town: LevelInput::Unset,
            },
        ),
        draft(
            "Country-wide logistics",
            AvailabilityScope::Country,
            LocationSelection {
                continent: LevelInput::Chosen(1),
                country: LevelInput::Chosen(10),
                state: LevelInput::Unset,
                town: LevelInput::Unset,
            },
        ),
        draft("State-wide repairs", AvailabilityScope::State, lagos_selection()),
        draft(
            "Ikeja tailoring",
            AvailabilityScope::Town,
            LocationSelection {
                town: LevelInput::Chosen(1000),
                ..lagos_selection()
            },
        ),
    ];

    drafts
        .into_iter()
        .map(|d| {
            fx.service
                .submit(d)
                .expect("submission succeeds")
                .listing
                .id
        })
        .collect()
}

fn titles(fx: &Fixture, viewer: &ViewerProfile) -> Vec<String> {
    fx.service
        .search(viewer, None)
        .expect("search succeeds")
        .into_iter()
        .map(|listing| listing.title)
        .collect()
}

#[test]
fn fully_resolved_viewer_sees_every_matching_scope() {
    let fx = fixture();
    seed_listings(&fx);

    let seen = titles(&fx, &lagos_viewer());
    assert_eq!(seen.len(), 5);
}

#[test]
fn anonymous_viewer_sees_only_global_listings() {
    let fx = fixture();
    seed_listings(&fx);

    let seen = titles(&fx, &ViewerProfile::anonymous());
    assert_eq!(seen, vec!["Global shipping".to_string()]);
}

#[test]
fn sibling_state_viewer_loses_state_and_town_listings() {
    let fx = fixture();
    seed_listings(&fx);

    // Same continent and country, but the Ogun sibling state.
    let viewer = ViewerProfile {
        state: Some(StateId(200)),
        town: None,
        ..lagos_viewer()
    };
    let seen = titles(&fx, &viewer);
    assert_eq!(seen.len(), 3);
    assert!(!seen.contains(&"State-wide repairs".to_string()));
    assert!(!seen.contains(&"Ikeja tailoring".to_string()));
}

#[test]
fn town_match_alone_is_not_enough() {
    let fx = fixture();
    seed_listings(&fx);

    // Right town id, wrong continent: nested equality must exclude the
    // town-scoped listing.
    let viewer = ViewerProfile {
        continent: Some(ContinentId(2)),
        ..lagos_viewer()
    };
    let seen = titles(&fx, &viewer);
    assert!(!seen.contains(&"Ikeja tailoring".to_string()));
    assert!(seen.contains(&"Global shipping".to_string()));
}

#[test]
fn partial_profile_unlocks_levels_progressively() {
    let fx = fixture();
    seed_listings(&fx);

    let continent_only = ViewerProfile {
        continent: Some(ContinentId(1)),
        ..ViewerProfile::anonymous()
    };
    assert_eq!(titles(&fx, &continent_only).len(), 2);

    let up_to_country = ViewerProfile {
        continent: Some(ContinentId(1)),
        country: Some(CountryId(10)),
        ..ViewerProfile::anonymous()
    };
    assert_eq!(titles(&fx, &up_to_country).len(), 3);
}

#[test]
fn keyword_composes_on_top_of_visibility() {
    let fx = fixture();
    seed_listings(&fx);

    let results = fx
        .service
        .search(&ViewerProfile::anonymous(), Some("tailoring"))
        .expect("search succeeds");
    assert!(
        results.is_empty(),
        "keyword match must not bypass the visibility rules"
    );

    let results = fx
        .service
        .search(&lagos_viewer(), Some("TAILORING"))
        .expect("search succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Ikeja tailoring");
}

#[test]
fn pending_listing_joins_search_only_after_approval() {
    let fx = fixture();
    let submitted = fx
        .service
        .submit(draft(
            "Epe fishing gear",
            AvailabilityScope::Town,
            LocationSelection {
                town: LevelInput::Typed("Epe".to_string()),
                ..lagos_selection()
            },
        ))
        .expect("submission succeeds");
    let pending = submitted.pending.expect("pending request");

    let everyone = ViewerProfile {
        town: None,
        ..lagos_viewer()
    };
    assert!(
        fx.service
            .search(&everyone, None)
            .expect("search")
            .is_empty(),
        "pending listings stay out of every result set"
    );

    let town = fx.service.approve_location(pending.id).expect("approval");

    let epe_viewer = ViewerProfile {
        town: Some(town.id),
        ..lagos_viewer()
    };
    let seen = titles(&fx, &epe_viewer);
    assert_eq!(seen, vec!["Epe fishing gear".to_string()]);
}
