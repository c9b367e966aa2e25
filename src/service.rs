// Copyright 2025 Cowboy AI, LLC.

//! TripService facade
//!
//! The single entry point a transport layer calls into. Every operation
//! runs load-mutate-persist against the trip repository, with the owner
//! filter applied inside the repository read. Compound mutations that touch
//! both the trip document and an activity record are write-ordered so a
//! dangling activity reference is never observable: records are created
//! before the document referencing them, and dereferenced before they are
//! deleted. A failed record delete can orphan a record, never dangle a
//! reference.

use crate::activity::{Activity, ActivityDraft, ActivityType, Note};
use crate::location::{LocationResolver, PlaceResult};
use crate::persistence::{ActivityStore, TripRepository};
use crate::route::{optimize_route, RouteStop};
use crate::share::ShareTokenIssuer;
use crate::trip::{BucketItem, Checklist, Trip, TripUpdate};
use crate::{
    ActivityId, BucketItemId, ChecklistItemId, GeoPoint, TripError, TripId, TripResult, UserId,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Bounded retries for share-token collisions before giving up
const MAX_TOKEN_ATTEMPTS: u32 = 3;

/// Upper bound on one round trip to the location provider
const LOCATION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// One itinerary day with its activity references resolved to records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayView {
    /// Day number, 1-based
    pub day: u32,
    /// Date snapshot taken when the day was first created
    pub date: String,
    /// Resolved activity records in the day's order
    pub activities: Vec<Activity>,
    /// Per-activity notes
    pub notes: IndexMap<ActivityId, Note>,
    /// Per-activity checklists
    pub checklists: Vec<Checklist>,
}

/// A whole trip with every day's activities resolved
///
/// This is the read shape for both owner reads and share-token reads; the
/// share token itself is not part of the view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripView {
    /// Trip identifier
    pub id: TripId,
    /// Owning user
    pub owner_id: UserId,
    /// Trip name
    pub name: String,
    /// Trip destination
    pub destination: String,
    /// Date strings, one per itinerary day
    pub dates: Vec<String>,
    /// Optional budget
    pub budget: Option<f64>,
    /// Resolved days in day-number order
    pub days: Vec<DayView>,
    /// Bucket list in insertion order
    pub bucket_list: Vec<BucketItem>,
    /// Whether a share link exists
    pub is_shared: bool,
}

/// Orchestrates trip operations over the repository, activity store,
/// location resolver, and share-token issuer
#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripRepository>,
    activities: Arc<dyn ActivityStore>,
    locations: Arc<dyn LocationResolver>,
    tokens: Arc<dyn ShareTokenIssuer>,
}

impl TripService {
    /// Create a service over the given collaborators
    pub fn new(
        trips: Arc<dyn TripRepository>,
        activities: Arc<dyn ActivityStore>,
        locations: Arc<dyn LocationResolver>,
        tokens: Arc<dyn ShareTokenIssuer>,
    ) -> Self {
        Self {
            trips,
            activities,
            locations,
            tokens,
        }
    }

    /// Search with a deadline; an elapsed timeout is a dependency failure,
    /// distinguishable from not-found so clients can retry
    async fn search_places(&self, query: &str, limit: usize) -> TripResult<Vec<PlaceResult>> {
        match tokio::time::timeout(LOCATION_TIMEOUT, self.locations.search(query, limit)).await {
            Ok(result) => result,
            Err(_) => Err(TripError::dependency("LocationResolver", "search timed out")),
        }
    }

    async fn load_owned(&self, trip_id: TripId, owner: UserId) -> TripResult<Trip> {
        self.trips
            .get_owned(trip_id, owner)
            .await?
            .ok_or_else(|| TripError::not_found("Trip", trip_id))
    }

    async fn resolve_day(&self, trip: &Trip, day: u32) -> TripResult<DayView> {
        let entry = trip
            .day(day)
            .ok_or_else(|| TripError::not_found("ItineraryDay", day))?;
        let activities = self.activities.get_many(entry.activities()).await?;
        Ok(DayView {
            day: entry.day(),
            date: entry.date().to_string(),
            activities,
            notes: entry
                .activities()
                .iter()
                .filter_map(|id| entry.note_for(*id).map(|n| (*id, n.clone())))
                .collect(),
            checklists: entry
                .activities()
                .iter()
                .flat_map(|id| entry.checklists_for(*id).cloned())
                .collect(),
        })
    }

    async fn resolve_trip(&self, trip: Trip) -> TripResult<TripView> {
        let mut days = Vec::new();
        for entry in trip.days() {
            days.push(self.resolve_day(&trip, entry.day()).await?);
        }
        Ok(TripView {
            id: trip.id(),
            owner_id: trip.owner_id(),
            name: trip.name().to_string(),
            destination: trip.destination().to_string(),
            dates: trip.dates().to_vec(),
            budget: trip.budget(),
            days,
            bucket_list: trip.bucket_list().to_vec(),
            is_shared: trip.is_shared(),
        })
    }

    /// Create a new trip for the owner
    #[instrument(skip(self), fields(%owner))]
    pub async fn create_trip(
        &self,
        owner: UserId,
        name: String,
        destination: String,
        dates: Vec<String>,
        budget: Option<f64>,
    ) -> TripResult<Trip> {
        let trip = Trip::new(owner, name, destination, dates, budget)?;
        self.trips.save(&trip).await?;
        info!(trip_id = %trip.id(), "trip created");
        Ok(trip)
    }

    /// Merge partial fields into an owned trip
    #[instrument(skip(self, update), fields(%trip_id, %owner))]
    pub async fn update_trip(
        &self,
        trip_id: TripId,
        owner: UserId,
        update: TripUpdate,
    ) -> TripResult<Trip> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.apply_update(update)?;
        self.trips.save(&trip).await?;
        debug!(%trip_id, "trip updated");
        Ok(trip)
    }

    /// Fetch a trip with its days' activities resolved
    ///
    /// Ownership is not enforced here; callers that need it pass through
    /// owner-scoped operations instead.
    #[instrument(skip(self), fields(%trip_id))]
    pub async fn get_trip(&self, trip_id: TripId) -> TripResult<TripView> {
        let trip = self
            .trips
            .get(trip_id)
            .await?
            .ok_or_else(|| TripError::not_found("Trip", trip_id))?;
        self.resolve_trip(trip).await
    }

    /// Read-only view of a shared trip by its token
    #[instrument(skip(self, token))]
    pub async fn get_shared_trip(&self, token: &str) -> TripResult<TripView> {
        let trip = self
            .trips
            .get_by_share_token(token)
            .await?
            .ok_or_else(|| TripError::not_found("Trip", "shared"))?;
        self.resolve_trip(trip).await
    }

    /// All trips for an owner, most recently created first
    #[instrument(skip(self), fields(%owner))]
    pub async fn list_trips(&self, owner: UserId) -> TripResult<Vec<Trip>> {
        self.trips.list_by_owner(owner).await
    }

    /// Delete an owned trip, cascading deletion of every referenced activity
    #[instrument(skip(self), fields(%trip_id, %owner))]
    pub async fn delete_trip(&self, trip_id: TripId, owner: UserId) -> TripResult<()> {
        let trip = self
            .trips
            .delete_owned(trip_id, owner)
            .await?
            .ok_or_else(|| TripError::not_found("Trip", trip_id))?;
        for activity_id in trip.all_activity_ids() {
            // the document is already gone, so a failed record delete only
            // orphans the record; keep going and let cleanup catch it
            if let Err(error) = self.activities.delete(activity_id).await {
                warn!(%activity_id, %error, "cascade delete left an orphaned activity");
            }
        }
        info!(%trip_id, "trip deleted");
        Ok(())
    }

    /// Create an activity and append it to a day, creating the day on first
    /// use; returns the updated day with activities resolved
    #[instrument(skip(self, draft), fields(%trip_id, %owner, day))]
    pub async fn add_itinerary_item(
        &self,
        trip_id: TripId,
        owner: UserId,
        day: u32,
        draft: ActivityDraft,
    ) -> TripResult<DayView> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.validate_day(day)?;
        let activity = Activity::from_draft(draft)?;
        let activity_id = activity.id;

        // record first, then the document referencing it
        self.activities.put(activity).await?;
        trip.add_activity_to_day(day, activity_id)?;
        if let Err(error) = self.trips.save(&trip).await {
            // compensate so the record is not orphaned by a failed save
            if let Err(cleanup) = self.activities.delete(activity_id).await {
                warn!(%activity_id, %cleanup, "compensation delete failed; activity orphaned");
            }
            return Err(error);
        }
        debug!(%activity_id, "itinerary item added");
        self.resolve_day(&trip, day).await
    }

    /// Remove an activity from a day and delete its record
    #[instrument(skip(self), fields(%trip_id, %owner, day, %activity_id))]
    pub async fn remove_itinerary_item(
        &self,
        trip_id: TripId,
        owner: UserId,
        day: u32,
        activity_id: ActivityId,
    ) -> TripResult<()> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.remove_activity_from_day(day, activity_id)?;
        // dereference before delete: a failed delete orphans the record
        // instead of leaving a dangling reference
        self.trips.save(&trip).await?;
        if let Err(error) = self.activities.delete(activity_id).await {
            warn!(%activity_id, %error, "record delete failed; activity orphaned");
        }
        debug!(%activity_id, "itinerary item removed");
        Ok(())
    }

    /// Append a new unconfirmed bucket item
    #[instrument(skip(self, name, description, photo_url, address), fields(%trip_id, %owner))]
    pub async fn add_bucket_item(
        &self,
        trip_id: TripId,
        owner: UserId,
        name: String,
        description: Option<String>,
        photo_url: Option<String>,
        address: Option<String>,
    ) -> TripResult<BucketItem> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        let item = trip
            .add_bucket_item(name, description, photo_url, address)?
            .clone();
        self.trips.save(&trip).await?;
        Ok(item)
    }

    /// Remove a bucket item
    #[instrument(skip(self), fields(%trip_id, %owner, %item_id))]
    pub async fn remove_bucket_item(
        &self,
        trip_id: TripId,
        owner: UserId,
        item_id: BucketItemId,
    ) -> TripResult<()> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.remove_bucket_item(item_id)?;
        self.trips.save(&trip).await?;
        Ok(())
    }

    /// Mark a bucket item confirmed or unconfirmed
    #[instrument(skip(self), fields(%trip_id, %owner, %item_id))]
    pub async fn confirm_bucket_item(
        &self,
        trip_id: TripId,
        owner: UserId,
        item_id: BucketItemId,
        confirmed: bool,
    ) -> TripResult<()> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.set_bucket_confirmed(item_id, confirmed)?;
        self.trips.save(&trip).await?;
        Ok(())
    }

    /// Promote a bucket item into the itinerary as an activity on a day
    ///
    /// Validation happens before any write, so a failed promotion leaves the
    /// bucket item untouched.
    #[instrument(skip(self), fields(%trip_id, %owner, %item_id, day))]
    pub async fn move_bucket_to_itinerary(
        &self,
        trip_id: TripId,
        owner: UserId,
        item_id: BucketItemId,
        day: u32,
        kind: Option<ActivityType>,
    ) -> TripResult<DayView> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.validate_day(day)?;
        let item = trip
            .bucket_item(item_id)
            .ok_or_else(|| TripError::not_found("BucketItem", item_id))?;
        let activity = Activity::from_draft(ActivityDraft {
            kind: kind.unwrap_or(ActivityType::Activity),
            name: item.name.clone(),
            description: item.description.clone(),
            location: item.address.clone(),
            ..Default::default()
        })?;
        let activity_id = activity.id;

        self.activities.put(activity).await?;
        trip.remove_bucket_item(item_id)?;
        trip.add_activity_to_day(day, activity_id)?;
        if let Err(error) = self.trips.save(&trip).await {
            if let Err(cleanup) = self.activities.delete(activity_id).await {
                warn!(%activity_id, %cleanup, "compensation delete failed; activity orphaned");
            }
            return Err(error);
        }
        debug!(%item_id, %activity_id, "bucket item promoted");
        self.resolve_day(&trip, day).await
    }

    /// Attach or replace a titled note on an activity
    #[instrument(skip(self, title, content), fields(%trip_id, %owner, %activity_id))]
    pub async fn add_note(
        &self,
        trip_id: TripId,
        owner: UserId,
        activity_id: ActivityId,
        title: String,
        content: String,
    ) -> TripResult<()> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.upsert_note(activity_id, title, content)?;
        self.trips.save(&trip).await?;
        Ok(())
    }

    /// Append texts to a titled checklist on an activity, creating the
    /// checklist on first use
    #[instrument(skip(self, title, texts), fields(%trip_id, %owner, %activity_id))]
    pub async fn add_checklist_items(
        &self,
        trip_id: TripId,
        owner: UserId,
        activity_id: ActivityId,
        title: String,
        texts: Vec<String>,
    ) -> TripResult<Checklist> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        let checklist = trip.add_checklist_items(activity_id, title, texts)?.clone();
        self.trips.save(&trip).await?;
        Ok(checklist)
    }

    /// Set the completion flag of one checklist item
    #[instrument(skip(self, title), fields(%trip_id, %owner, %activity_id, %item_id))]
    pub async fn set_checklist_item(
        &self,
        trip_id: TripId,
        owner: UserId,
        activity_id: ActivityId,
        title: String,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> TripResult<()> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        trip.set_checklist_item(activity_id, &title, item_id, completed)?;
        self.trips.save(&trip).await?;
        Ok(())
    }

    /// Reorder a day's activities by geographic proximity and persist the
    /// new ordering
    #[instrument(skip(self), fields(%trip_id, %owner, day))]
    pub async fn optimize_day(
        &self,
        trip_id: TripId,
        owner: UserId,
        day: u32,
    ) -> TripResult<DayView> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        let entry = trip
            .day(day)
            .ok_or_else(|| TripError::not_found("ItineraryDay", day))?;
        let references = entry.activities().to_vec();

        let records: HashMap<ActivityId, Activity> = self
            .activities
            .get_many(&references)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let stops: Vec<RouteStop> = references
            .iter()
            .map(|id| RouteStop {
                activity_id: *id,
                // unresolvable records have no coordinates; they anchor
                coordinates: records.get(id).and_then(|a| a.coordinates),
            })
            .collect();

        let order = optimize_route(&stops);
        trip.reorder_day(day, order)?;
        self.trips.save(&trip).await?;
        debug!(day, "day route optimized");
        self.resolve_day(&trip, day).await
    }

    /// Generate (or return the existing) read-only share token for a trip
    ///
    /// Idempotent: sharing an already-shared trip returns the original
    /// token. Token candidates colliding with another trip's active token
    /// are retried a bounded number of times, then `Conflict` is returned.
    #[instrument(skip(self), fields(%trip_id, %owner))]
    pub async fn share_trip(&self, trip_id: TripId, owner: UserId) -> TripResult<String> {
        let mut trip = self.load_owned(trip_id, owner).await?;
        if let Some(token) = trip.share_token() {
            return Ok(token.to_string());
        }
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let candidate = self.tokens.issue();
            if self.trips.get_by_share_token(&candidate).await?.is_some() {
                continue;
            }
            trip.mark_shared(candidate.clone());
            self.trips.save(&trip).await?;
            info!(%trip_id, "trip shared");
            return Ok(candidate);
        }
        Err(TripError::Conflict(
            "share token generation exhausted retries".to_string(),
        ))
    }

    /// Search the external place provider on behalf of an owned trip
    #[instrument(skip(self, query), fields(%trip_id, %owner, limit))]
    pub async fn search_locations(
        &self,
        trip_id: TripId,
        owner: UserId,
        query: &str,
        limit: usize,
    ) -> TripResult<Vec<PlaceResult>> {
        if query.trim().is_empty() {
            return Err(TripError::validation("query must not be empty"));
        }
        self.load_owned(trip_id, owner).await?;
        self.search_places(query, limit).await
    }

    /// Write the best search result's address and coordinates back onto an
    /// activity of the given day
    #[instrument(skip(self, query), fields(%trip_id, %owner, day, %activity_id))]
    pub async fn autofill_location(
        &self,
        trip_id: TripId,
        owner: UserId,
        day: u32,
        activity_id: ActivityId,
        query: &str,
    ) -> TripResult<Activity> {
        if query.trim().is_empty() {
            return Err(TripError::validation("query must not be empty"));
        }
        let trip = self.load_owned(trip_id, owner).await?;
        let entry = trip
            .day(day)
            .ok_or_else(|| TripError::not_found("ItineraryDay", day))?;
        if !entry.activities().contains(&activity_id) {
            return Err(TripError::not_found("Activity", activity_id));
        }

        let results = self.search_places(query, 1).await?;
        let best = results
            .into_iter()
            .next()
            .ok_or_else(|| TripError::not_found("Place", query))?;

        let mut activity = self
            .activities
            .get(activity_id)
            .await?
            .ok_or_else(|| TripError::not_found("Activity", activity_id))?;
        if best.address.is_some() {
            activity.location = best.address.clone();
        }
        if let (Some(lat), Some(lon)) = (best.lat, best.lon) {
            // out-of-range coordinates are a provider contract breach, not
            // caller input
            activity.coordinates = Some(GeoPoint::new(lat, lon).map_err(|_| {
                TripError::dependency(
                    "LocationResolver",
                    format!("provider returned out-of-range coordinates: {lat},{lon}"),
                )
            })?);
        }
        self.activities.put(activity.clone()).await?;
        debug!(%activity_id, "location autofilled");
        Ok(activity)
    }
}
