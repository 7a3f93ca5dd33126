//! Core engine for a geographically scoped classifieds marketplace.
//!
//! The crate is organized around two module trees: [`geo`] holds the location
//! hierarchy, availability-scope resolution, the pending town review queue, and
//! the visibility rules; [`listings`] holds the listing domain, its storage
//! traits, the intake service that wires the geo pieces together, and the HTTP
//! router exposed to the API service.

pub mod config;
pub mod error;
pub mod geo;
pub mod listings;
pub mod telemetry;
