// Copyright 2025 Cowboy AI, LLC.

//! In-memory document stores
//!
//! Hash-map tables behind an async `RwLock`, holding whole documents as
//! serialized JSON. Writes replace the document, which gives the same
//! last-writer-wins semantics as the document stores these stand in for;
//! serialization failures surface as `Dependency`, never raw.

use super::{ActivityStore, TripRepository};
use crate::{Activity, ActivityId, Trip, TripError, TripId, TripResult, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

fn encode<T: serde::Serialize>(store: &str, value: &T) -> TripResult<String> {
    serde_json::to_string(value).map_err(|e| TripError::dependency(store, e))
}

fn decode<T: serde::de::DeserializeOwned>(store: &str, document: &str) -> TripResult<T> {
    serde_json::from_str(document).map_err(|e| TripError::dependency(store, e))
}

/// In-memory activity record table
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityStore {
    records: Arc<RwLock<HashMap<ActivityId, String>>>,
}

impl InMemoryActivityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn put(&self, activity: Activity) -> TripResult<()> {
        let document = encode("activity-store", &activity)?;
        self.records.write().await.insert(activity.id, document);
        Ok(())
    }

    async fn get(&self, id: ActivityId) -> TripResult<Option<Activity>> {
        self.records
            .read()
            .await
            .get(&id)
            .map(|doc| decode("activity-store", doc))
            .transpose()
    }

    async fn get_many(&self, ids: &[ActivityId]) -> TripResult<Vec<Activity>> {
        let records = self.records.read().await;
        ids.iter()
            .filter_map(|id| records.get(id))
            .map(|doc| decode("activity-store", doc))
            .collect()
    }

    async fn delete(&self, id: ActivityId) -> TripResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}

/// In-memory trip document table
#[derive(Debug, Clone, Default)]
pub struct InMemoryTripRepository {
    documents: Arc<RwLock<HashMap<TripId, String>>>,
}

impl InMemoryTripRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    async fn scan<F>(&self, mut keep: F) -> TripResult<Vec<Trip>>
    where
        F: FnMut(&Trip) -> bool,
    {
        let documents = self.documents.read().await;
        let mut trips = Vec::new();
        for doc in documents.values() {
            let trip: Trip = decode("trip-store", doc)?;
            if keep(&trip) {
                trips.push(trip);
            }
        }
        Ok(trips)
    }
}

#[async_trait]
impl TripRepository for InMemoryTripRepository {
    async fn save(&self, trip: &Trip) -> TripResult<()> {
        let document = encode("trip-store", trip)?;
        self.documents.write().await.insert(trip.id(), document);
        Ok(())
    }

    async fn get(&self, id: TripId) -> TripResult<Option<Trip>> {
        self.documents
            .read()
            .await
            .get(&id)
            .map(|doc| decode("trip-store", doc))
            .transpose()
    }

    async fn get_owned(&self, id: TripId, owner: UserId) -> TripResult<Option<Trip>> {
        Ok(self.get(id).await?.filter(|t| t.owner_id() == owner))
    }

    async fn get_by_share_token(&self, token: &str) -> TripResult<Option<Trip>> {
        let matches = self.scan(|t| t.share_token() == Some(token)).await?;
        Ok(matches.into_iter().next())
    }

    async fn list_by_owner(&self, owner: UserId) -> TripResult<Vec<Trip>> {
        let mut trips = self.scan(|t| t.owner_id() == owner).await?;
        // most recent first; id as tie-breaker for a stable listing
        trips.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(trips)
    }

    async fn delete_owned(&self, id: TripId, owner: UserId) -> TripResult<Option<Trip>> {
        let mut documents = self.documents.write().await;
        let owned = match documents.get(&id) {
            Some(doc) => {
                let trip: Trip = decode("trip-store", doc)?;
                (trip.owner_id() == owner).then_some(trip)
            }
            None => None,
        };
        if owned.is_some() {
            documents.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityDraft;

    fn sample_trip(owner: UserId) -> Trip {
        Trip::new(owner, "Coast Run", "Galle", vec!["2025-12-01".to_string()], None).unwrap()
    }

    #[tokio::test]
    async fn test_activity_store_round_trip() {
        let store = InMemoryActivityStore::new();
        let activity = Activity::from_draft(ActivityDraft {
            name: "Unawatuna Beach".to_string(),
            ..Default::default()
        })
        .unwrap();
        let id = activity.id;

        store.put(activity.clone()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), Some(activity));

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert_eq!(store.get(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_many_preserves_order_and_skips_missing() {
        let store = InMemoryActivityStore::new();
        let a = Activity::from_draft(ActivityDraft {
            name: "A".to_string(),
            ..Default::default()
        })
        .unwrap();
        let b = Activity::from_draft(ActivityDraft {
            name: "B".to_string(),
            ..Default::default()
        })
        .unwrap();
        store.put(a.clone()).await.unwrap();
        store.put(b.clone()).await.unwrap();

        let fetched = store
            .get_many(&[b.id, ActivityId::new(), a.id])
            .await
            .unwrap();
        let names: Vec<&str> = fetched.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_owner_filter_is_part_of_the_read() {
        let repo = InMemoryTripRepository::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let trip = sample_trip(owner);
        repo.save(&trip).await.unwrap();

        assert!(repo.get_owned(trip.id(), owner).await.unwrap().is_some());
        assert!(repo.get_owned(trip.id(), stranger).await.unwrap().is_none());

        // a cross-owner delete is not observable, even partially
        assert!(repo.delete_owned(trip.id(), stranger).await.unwrap().is_none());
        assert!(repo.get(trip.id()).await.unwrap().is_some());

        assert!(repo.delete_owned(trip.id(), owner).await.unwrap().is_some());
        assert!(repo.get(trip.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_most_recent_first() {
        let repo = InMemoryTripRepository::new();
        let owner = UserId::new();

        let first = sample_trip(owner);
        repo.save(&first).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = sample_trip(owner);
        repo.save(&second).await.unwrap();
        repo.save(&sample_trip(UserId::new())).await.unwrap();

        let listed = repo.list_by_owner(owner).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
    }

    #[tokio::test]
    async fn test_share_token_lookup() {
        let repo = InMemoryTripRepository::new();
        let mut trip = sample_trip(UserId::new());
        trip.mark_shared("cafef00d".to_string());
        repo.save(&trip).await.unwrap();

        let found = repo.get_by_share_token("cafef00d").await.unwrap().unwrap();
        assert_eq!(found.id(), trip.id());
        assert!(repo.get_by_share_token("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_documents_survive_the_codec() {
        let repo = InMemoryTripRepository::new();
        let owner = UserId::new();
        let mut trip = sample_trip(owner);
        let activity = ActivityId::new();
        trip.add_activity_to_day(1, activity).unwrap();
        trip.upsert_note(activity, "Packing", "sunscreen").unwrap();
        repo.save(&trip).await.unwrap();

        let loaded = repo.get_owned(trip.id(), owner).await.unwrap().unwrap();
        assert_eq!(loaded, trip);
        loaded.verify_invariants().unwrap();
    }
}
