// Copyright 2025 Cowboy AI, LLC.

//! # Trip Domain
//!
//! Domain model for a traveler's trip plan: a day-structured itinerary of
//! activities, a staging bucket list of unscheduled candidates, per-activity
//! notes and checklists, read-only share links, and day-level route
//! re-ordering by geographic proximity.
//!
//! The model is an aggregate with external leaf records: one document per
//! [`Trip`] holding days, bucket items, notes, and checklists, while
//! [`Activity`] records are stored independently and referenced by id from
//! day entries. All mutation goes through [`TripService`], which loads the
//! document, applies an invariant-checked change on the aggregate, and
//! persists it.
//!
//! ## Design Principles
//!
//! 1. **Typed identifiers**: phantom-typed ids keep trip, activity, and user
//!    ids apart at compile time
//! 2. **Invariants at the aggregate**: day bounds, day uniqueness, single
//!    ownership of activity references, and share-state consistency are
//!    enforced by [`Trip`] itself
//! 3. **Write ordering over transactions**: compound mutations are ordered
//!    so a dangling activity reference is never observable
//! 4. **Typed failures**: every operation returns one of the four
//!    [`TripError`] kinds; collaborator errors never leak through raw
//!
//! Transport bindings, authentication, and the place-search provider are
//! external collaborators; the service trusts the caller-supplied user id
//! and consumes search through the [`LocationResolver`] trait.

#![warn(missing_docs)]

mod activity;
mod errors;
mod identifiers;
mod location;
pub mod persistence;
mod route;
mod service;
mod share;
mod trip;

pub use activity::{Activity, ActivityDraft, ActivityType, ChecklistItem, GeoPoint, Note};
pub use errors::{TripError, TripResult};
pub use identifiers::{
    ActivityId, ActivityMarker, BucketItemId, BucketItemMarker, ChecklistItemId,
    ChecklistItemMarker, EntityId, TripId, TripMarker, UserId, UserMarker,
};
pub use location::{LocationResolver, PlaceResult};
pub use route::{haversine_km, optimize_route, RouteStop};
pub use service::{DayView, TripService, TripView};
pub use share::{RandomTokenIssuer, ShareTokenIssuer};
pub use trip::{BucketItem, Checklist, ItineraryDay, Trip, TripUpdate};
