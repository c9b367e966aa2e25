// Copyright 2025 Cowboy AI, LLC.

//! Phantom-typed identifiers for trips, activities, and their owners
//!
//! Every identifier wraps a UUID and carries a marker type so that ids for
//! different record kinds cannot be mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// A typed identifier backed by a UUID
///
/// The phantom type parameter ties an id to the record kind it names.
///
/// # Examples
///
/// ```rust
/// use trip_domain::{TripId, ActivityId};
///
/// let trip_id = TripId::new();
/// let activity_id = ActivityId::new();
///
/// // These are different types - won't compile if mixed up:
/// // let _: TripId = activity_id; // ERROR!
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId<T> {
    id: Uuid,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

impl<T> EntityId<T> {
    /// Create a new random identifier
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            _phantom: PhantomData,
        }
    }

    /// Create an identifier from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }
}

// Manual impls so the marker type is not required to implement these itself.
impl<T> Clone for EntityId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntityId<T> {}

impl<T> PartialEq for EntityId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for EntityId<T> {}

impl<T> std::hash::Hash for EntityId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> PartialOrd for EntityId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for EntityId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> From<&EntityId<T>> for Uuid {
    fn from(id: &EntityId<T>) -> Self {
        id.id
    }
}

/// Marker type for Trip aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripMarker;

/// Marker type for Activity records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityMarker;

/// Marker type for the owning user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserMarker;

/// Marker type for bucket list items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketItemMarker;

/// Marker type for checklist items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChecklistItemMarker;

/// Identifier of a Trip aggregate
pub type TripId = EntityId<TripMarker>;

/// Identifier of an independently stored Activity record
pub type ActivityId = EntityId<ActivityMarker>;

/// Identifier of the user owning a trip
pub type UserId = EntityId<UserMarker>;

/// Identifier of a bucket list item
pub type BucketItemId = EntityId<BucketItemMarker>;

/// Identifier of a single checklist entry
pub type ChecklistItemId = EntityId<ChecklistItemMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = TripId::new();
        let b = TripId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_round_trips_through_uuid() {
        let id = ActivityId::new();
        let uuid: Uuid = id.into();
        assert_eq!(ActivityId::from_uuid(uuid), id);
    }

    #[test]
    fn test_display_matches_uuid() {
        let id = UserId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn test_serde_round_trip() {
        let id = TripId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: TripId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
