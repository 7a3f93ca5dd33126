//! CLI walkthrough of the full listing/review/search flow against the seeded
//! in-memory stores. Useful for demos and smoke checks without HTTP.

use std::sync::Arc;

use clap::Args;
use tradepost::error::AppError;
use tradepost::geo::{
    AvailabilityScope, ContinentId, CountryId, InMemoryPendingRequests, LevelInput,
    LocationSelection, StateId, ViewerProfile,
};
use tradepost::listings::domain::{ListingDraft, ListingKind, PersonId};
use tradepost::listings::{ListingService, ListingServiceError};

use crate::infra::{seed_directory, InMemoryListings, LogNotifier};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Keyword to filter the final search with
    #[arg(long)]
    pub(crate) keyword: Option<String>,
}

type DemoService = ListingService<
    tradepost::geo::InMemoryLocationDirectory,
    InMemoryListings,
    InMemoryPendingRequests,
    LogNotifier,
>;

fn build_service() -> Arc<DemoService> {
    let directory = Arc::new(seed_directory());
    let listings = Arc::new(InMemoryListings::new());
    let requests = Arc::new(InMemoryPendingRequests::new());
    let notifier = Arc::new(LogNotifier);
    Arc::new(ListingService::new(directory, listings, requests, notifier))
}

fn lagos_selection() -> LocationSelection {
    LocationSelection {
        continent: LevelInput::Chosen(1),
        country: LevelInput::Chosen(10),
        state: LevelInput::Chosen(100),
        town: LevelInput::Unset,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = build_service();

    println!("== authoring ==");

    let offer = service
        .submit(ListingDraft {
            kind: ListingKind::Offer,
            title: "Generator repair".to_string(),
            body: "Same-day generator servicing across the state.".to_string(),
            author: PersonId(1),
            declared_scope: AvailabilityScope::State,
            location: lagos_selection(),
        })
        .map_err(demo_failure)?;
    println!(
        "offer #{} active at scope '{}'",
        offer.listing.id.0,
        offer.listing.placement.scope.label()
    );

    let seeker = service
        .submit(ListingDraft {
            kind: ListingKind::Seeker,
            title: "Looking for a welder".to_string(),
            body: "Gate repair work in Epe.".to_string(),
            author: PersonId(2),
            declared_scope: AvailabilityScope::Town,
            location: LocationSelection {
                town: LevelInput::Typed("epe".to_string()),
                ..lagos_selection()
            },
        })
        .map_err(demo_failure)?;
    let pending = seeker.pending.ok_or_else(|| {
        AppError::Io(std::io::Error::other("typed town did not enter review"))
    })?;
    println!(
        "seeker #{} parked pending review of typed town '{}'",
        seeker.listing.id.0, pending.typed_name
    );

    println!("== moderation ==");
    let queue = service.review_queue(10).map_err(demo_failure)?;
    println!("{} request(s) awaiting review", queue.len());

    let town = service.approve_location(pending.id).map_err(demo_failure)?;
    println!(
        "approved: town '{}' (id {}, code {}) now in the directory",
        town.name, town.id.0, town.code
    );

    println!("== search ==");
    let lagos_viewer = ViewerProfile {
        continent: Some(ContinentId(1)),
        country: Some(CountryId(10)),
        state: Some(StateId(100)),
        town: Some(town.id),
    };
    let keyword = args.keyword.as_deref();

    let results = service.search(&lagos_viewer, keyword).map_err(demo_failure)?;
    println!("lagos viewer sees {} listing(s):", results.len());
    for listing in &results {
        println!(
            "  [{}] {} ({}-scoped, {})",
            listing.id.0,
            listing.title,
            listing.placement.scope.label(),
            listing.kind.label()
        );
    }

    let anonymous = service
        .search(&ViewerProfile::anonymous(), keyword)
        .map_err(demo_failure)?;
    println!("anonymous viewer sees {} listing(s)", anonymous.len());

    Ok(())
}

fn demo_failure(err: ListingServiceError) -> AppError {
    AppError::Io(std::io::Error::other(err.to_string()))
}
