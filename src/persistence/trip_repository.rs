// Copyright 2025 Cowboy AI, LLC.

//! Durable storage for Trip aggregates

use crate::{Trip, TripId, TripResult, UserId};
use async_trait::async_trait;

/// Storage for trip documents, keyed by trip id with owner-scoped queries
///
/// The owner filter is part of the read itself: `get_owned` and
/// `delete_owned` match `(trip_id, owner_id)` atomically, so callers never
/// perform a separate ownership comparison that a concurrent write could
/// race past.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Insert or replace the trip document
    async fn save(&self, trip: &Trip) -> TripResult<()>;

    /// Fetch a trip by id regardless of owner, `None` if absent
    async fn get(&self, id: TripId) -> TripResult<Option<Trip>>;

    /// Fetch a trip matching both id and owner, `None` if either mismatches
    async fn get_owned(&self, id: TripId, owner: UserId) -> TripResult<Option<Trip>>;

    /// Fetch the trip holding an active share token, `None` if no match
    async fn get_by_share_token(&self, token: &str) -> TripResult<Option<Trip>>;

    /// All trips for an owner, most recently created first
    async fn list_by_owner(&self, owner: UserId) -> TripResult<Vec<Trip>>;

    /// Remove a trip matching both id and owner; returns the removed
    /// document so callers can cascade activity deletion
    async fn delete_owned(&self, id: TripId, owner: UserId) -> TripResult<Option<Trip>>;
}
