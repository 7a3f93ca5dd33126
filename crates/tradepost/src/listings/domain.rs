use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::scope::{AvailabilityScope, LocationSelection};
use crate::geo::visibility::Placement;

/// Identifier wrapper for published listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub u64);

/// Identifier wrapper for marketplace members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

/// Offers advertise a product/service/labor; seekers request one. The two are
/// structurally identical as far as placement and visibility are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Offer,
    Seeker,
}

impl ListingKind {
    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Offer => "offer",
            ListingKind::Seeker => "seeker",
        }
    }
}

/// Moderation status shared by listings and member location profiles. Only
/// approved entities participate in search results; a pending or corrected
/// entity can still browse the full approved set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    PendingReview,
    AwaitingCorrection,
}

impl ApprovalStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::PendingReview => "pending_review",
            ApprovalStatus::AwaitingCorrection => "awaiting_correction",
        }
    }
}

/// A stored listing with its resolved placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub kind: ListingKind,
    pub title: String,
    pub body: String,
    pub author: PersonId,
    pub placement: Placement,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw authoring input before scope resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub kind: ListingKind,
    pub title: String,
    pub body: String,
    pub author: PersonId,
    pub declared_scope: AvailabilityScope,
    pub location: LocationSelection,
}
