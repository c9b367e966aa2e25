// Copyright 2025 Cowboy AI, LLC.

//! The Trip aggregate and its invariant-checked mutations
//!
//! A Trip is the root document grouping an itinerary, a bucket list, and
//! sharing state. Days embed ordered references to independently stored
//! Activity records; all mutation goes through the aggregate so the day
//! bounds, uniqueness, and sharing invariants hold after every change.

use crate::activity::{ChecklistItem, Note};
use crate::{ActivityId, BucketItemId, ChecklistItemId, TripError, TripId, TripResult, UserId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named checklist attached to one activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    /// Activity this checklist belongs to
    pub activity_id: ActivityId,
    /// Checklist title, unique per activity
    pub title: String,
    /// Ordered checklist entries
    pub items: Vec<ChecklistItem>,
}

/// One day of the itinerary
///
/// Owns the ordering of its activity references and the per-activity notes
/// and checklists of that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    day: u32,
    date: String,
    activities: Vec<ActivityId>,
    #[serde(default)]
    notes: IndexMap<ActivityId, Note>,
    #[serde(default)]
    checklists: Vec<Checklist>,
}

impl ItineraryDay {
    fn new(day: u32, date: String) -> Self {
        Self {
            day,
            date,
            activities: Vec::new(),
            notes: IndexMap::new(),
            checklists: Vec::new(),
        }
    }

    /// Day number, 1-based
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Date snapshot taken from `trip.dates[day - 1]` when the day was first
    /// created; not re-synced if the trip's dates change later
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Ordered activity references owned by this day
    pub fn activities(&self) -> &[ActivityId] {
        &self.activities
    }

    /// The note attached to an activity, if any
    pub fn note_for(&self, activity_id: ActivityId) -> Option<&Note> {
        self.notes.get(&activity_id)
    }

    /// All checklists attached to an activity
    pub fn checklists_for(&self, activity_id: ActivityId) -> impl Iterator<Item = &Checklist> {
        self.checklists
            .iter()
            .filter(move |c| c.activity_id == activity_id)
    }

    fn checklist_mut(&mut self, activity_id: ActivityId, title: &str) -> Option<&mut Checklist> {
        self.checklists
            .iter_mut()
            .find(|c| c.activity_id == activity_id && c.title == title)
    }

    fn contains(&self, activity_id: ActivityId) -> bool {
        self.activities.contains(&activity_id)
    }

    fn forget_activity(&mut self, activity_id: ActivityId) {
        self.activities.retain(|id| *id != activity_id);
        self.notes.shift_remove(&activity_id);
        self.checklists.retain(|c| c.activity_id != activity_id);
    }
}

/// An unscheduled activity candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketItem {
    /// Unique identifier
    pub id: BucketItemId,
    /// Display name, non-empty after trimming
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Whether the owner has confirmed they want to do this
    pub confirmed: bool,
    /// Optional photo URL
    pub photo_url: Option<String>,
    /// Optional address text
    pub address: Option<String>,
}

/// Partial fields for a trip update; only provided fields are merged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripUpdate {
    /// New trip name
    pub name: Option<String>,
    /// New destination
    pub destination: Option<String>,
    /// Replacement date sequence
    pub dates: Option<Vec<String>>,
    /// New budget
    pub budget: Option<f64>,
}

/// The trip root aggregate
///
/// One document per trip: name, destination, dates, budget, the itinerary
/// keyed by day number, the bucket list, and sharing state. Activity records
/// are referenced by id, never embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    id: TripId,
    owner_id: UserId,
    name: String,
    destination: String,
    dates: Vec<String>,
    budget: Option<f64>,
    itinerary: BTreeMap<u32, ItineraryDay>,
    bucket_list: Vec<BucketItem>,
    is_shared: bool,
    share_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Trip {
    /// Create a new trip with an empty itinerary and bucket list
    pub fn new(
        owner_id: UserId,
        name: impl Into<String>,
        destination: impl Into<String>,
        dates: Vec<String>,
        budget: Option<f64>,
    ) -> TripResult<Self> {
        let name = name.into();
        let destination = destination.into();
        if name.trim().is_empty() {
            return Err(TripError::validation("trip name must not be empty"));
        }
        if destination.trim().is_empty() {
            return Err(TripError::validation("destination must not be empty"));
        }
        if dates.is_empty() {
            return Err(TripError::validation("dates must not be empty"));
        }
        if let Some(budget) = budget {
            if budget < 0.0 {
                return Err(TripError::validation("budget must not be negative"));
            }
        }
        let now = Utc::now();
        Ok(Self {
            id: TripId::new(),
            owner_id,
            name,
            destination,
            dates,
            budget,
            itinerary: BTreeMap::new(),
            bucket_list: Vec::new(),
            is_shared: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Trip identifier
    pub fn id(&self) -> TripId {
        self.id
    }

    /// Owning user; immutable after creation
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Trip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trip destination
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Date strings; index `i` corresponds to itinerary day `i + 1`
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Optional non-negative budget
    pub fn budget(&self) -> Option<f64> {
        self.budget
    }

    /// Itinerary days in day-number order
    pub fn days(&self) -> impl Iterator<Item = &ItineraryDay> {
        self.itinerary.values()
    }

    /// One itinerary day, if it has been created
    pub fn day(&self, day: u32) -> Option<&ItineraryDay> {
        self.itinerary.get(&day)
    }

    /// Bucket list in insertion order
    pub fn bucket_list(&self) -> &[BucketItem] {
        &self.bucket_list
    }

    /// Whether a read-only share link exists for this trip
    pub fn is_shared(&self) -> bool {
        self.is_shared
    }

    /// The share token, present iff the trip is shared
    pub fn share_token(&self) -> Option<&str> {
        self.share_token.as_deref()
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Every activity id referenced by any day, in day order
    pub fn all_activity_ids(&self) -> Vec<ActivityId> {
        self.itinerary
            .values()
            .flat_map(|d| d.activities.iter().copied())
            .collect()
    }

    /// The day number owning the given activity, if any
    pub fn day_of_activity(&self, activity_id: ActivityId) -> Option<u32> {
        self.itinerary
            .values()
            .find(|d| d.contains(activity_id))
            .map(|d| d.day)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Merge the provided fields into the trip
    ///
    /// `dates` may not become empty and may not shrink below the highest
    /// existing itinerary day number; `budget` may not become negative.
    pub fn apply_update(&mut self, update: TripUpdate) -> TripResult<()> {
        if let Some(dates) = &update.dates {
            if dates.is_empty() {
                return Err(TripError::validation("dates must not be empty"));
            }
            if let Some(max_day) = self.itinerary.keys().next_back() {
                if (dates.len() as u32) < *max_day {
                    return Err(TripError::validation(format!(
                        "dates cover {} days but itinerary already has day {max_day}",
                        dates.len()
                    )));
                }
            }
        }
        if let Some(budget) = update.budget {
            if budget < 0.0 {
                return Err(TripError::validation("budget must not be negative"));
            }
        }
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(TripError::validation("trip name must not be empty"));
            }
            self.name = name;
        }
        if let Some(destination) = update.destination {
            if destination.trim().is_empty() {
                return Err(TripError::validation("destination must not be empty"));
            }
            self.destination = destination;
        }
        if let Some(dates) = update.dates {
            self.dates = dates;
        }
        if let Some(budget) = update.budget {
            self.budget = Some(budget);
        }
        self.touch();
        Ok(())
    }

    /// Validate a day number against the trip's date range
    pub fn validate_day(&self, day: u32) -> TripResult<()> {
        if day == 0 || day as usize > self.dates.len() {
            return Err(TripError::validation(format!(
                "day {day} is out of range for a {}-day trip",
                self.dates.len()
            )));
        }
        Ok(())
    }

    /// Get or create the itinerary day, snapshotting its date on first use
    fn ensure_day(&mut self, day: u32) -> TripResult<&mut ItineraryDay> {
        self.validate_day(day)?;
        let date = self.dates[day as usize - 1].clone();
        Ok(self
            .itinerary
            .entry(day)
            .or_insert_with(|| ItineraryDay::new(day, date)))
    }

    /// Append an activity reference to a day, creating the day on first use
    pub fn add_activity_to_day(&mut self, day: u32, activity_id: ActivityId) -> TripResult<()> {
        self.ensure_day(day)?.activities.push(activity_id);
        self.touch();
        Ok(())
    }

    /// Remove an activity reference (and its notes and checklists) from a day
    ///
    /// Fails with `NotFound` if the day has not been created or the activity
    /// is not on it; the day itself is kept even when it becomes empty.
    pub fn remove_activity_from_day(
        &mut self,
        day: u32,
        activity_id: ActivityId,
    ) -> TripResult<()> {
        let entry = self
            .itinerary
            .get_mut(&day)
            .ok_or_else(|| TripError::not_found("ItineraryDay", day))?;
        if !entry.contains(activity_id) {
            return Err(TripError::not_found("Activity", activity_id));
        }
        entry.forget_activity(activity_id);
        self.touch();
        Ok(())
    }

    /// Replace a day's activity ordering with a permutation of itself
    pub fn reorder_day(&mut self, day: u32, order: Vec<ActivityId>) -> TripResult<()> {
        let entry = self
            .itinerary
            .get_mut(&day)
            .ok_or_else(|| TripError::not_found("ItineraryDay", day))?;
        let mut expected = entry.activities.clone();
        let mut given = order.clone();
        expected.sort();
        given.sort();
        if expected != given {
            return Err(TripError::validation(
                "new ordering must be a permutation of the day's activities",
            ));
        }
        entry.activities = order;
        self.touch();
        Ok(())
    }

    /// Append a new unconfirmed bucket item
    pub fn add_bucket_item(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        photo_url: Option<String>,
        address: Option<String>,
    ) -> TripResult<&BucketItem> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(TripError::validation(
                "bucket item name must not be empty",
            ));
        }
        self.bucket_list.push(BucketItem {
            id: BucketItemId::new(),
            name,
            description,
            confirmed: false,
            photo_url,
            address,
        });
        self.touch();
        Ok(self.bucket_list.last().expect("just pushed"))
    }

    /// Look up a bucket item by id
    pub fn bucket_item(&self, item_id: BucketItemId) -> Option<&BucketItem> {
        self.bucket_list.iter().find(|i| i.id == item_id)
    }

    /// Remove and return a bucket item
    pub fn remove_bucket_item(&mut self, item_id: BucketItemId) -> TripResult<BucketItem> {
        let index = self
            .bucket_list
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| TripError::not_found("BucketItem", item_id))?;
        let item = self.bucket_list.remove(index);
        self.touch();
        Ok(item)
    }

    /// Mark a bucket item confirmed or unconfirmed
    pub fn set_bucket_confirmed(
        &mut self,
        item_id: BucketItemId,
        confirmed: bool,
    ) -> TripResult<()> {
        let item = self
            .bucket_list
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| TripError::not_found("BucketItem", item_id))?;
        item.confirmed = confirmed;
        self.touch();
        Ok(())
    }

    fn day_of_activity_mut(&mut self, activity_id: ActivityId) -> TripResult<&mut ItineraryDay> {
        self.itinerary
            .values_mut()
            .find(|d| d.contains(activity_id))
            .ok_or_else(|| TripError::not_found("Activity", activity_id))
    }

    /// Attach or replace the titled note on an activity
    pub fn upsert_note(
        &mut self,
        activity_id: ActivityId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> TripResult<()> {
        let note = Note {
            title: title.into(),
            content: content.into(),
        };
        self.day_of_activity_mut(activity_id)?
            .notes
            .insert(activity_id, note);
        self.touch();
        Ok(())
    }

    /// Append items to a titled checklist, creating it on first use
    ///
    /// Each text becomes a fresh unchecked item.
    pub fn add_checklist_items(
        &mut self,
        activity_id: ActivityId,
        title: impl Into<String>,
        texts: Vec<String>,
    ) -> TripResult<&Checklist> {
        let title = title.into();
        let day = self.day_of_activity_mut(activity_id)?;
        let day_number = day.day;
        let items = texts.into_iter().map(ChecklistItem::new);
        let index = match day
            .checklists
            .iter()
            .position(|c| c.activity_id == activity_id && c.title == title)
        {
            Some(index) => {
                day.checklists[index].items.extend(items);
                index
            }
            None => {
                day.checklists.push(Checklist {
                    activity_id,
                    title,
                    items: items.collect(),
                });
                day.checklists.len() - 1
            }
        };
        self.touch();
        Ok(&self.itinerary[&day_number].checklists[index])
    }

    /// Set the completion flag of one checklist item
    pub fn set_checklist_item(
        &mut self,
        activity_id: ActivityId,
        title: &str,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> TripResult<()> {
        let day = self.day_of_activity_mut(activity_id)?;
        let checklist = day
            .checklist_mut(activity_id, title)
            .ok_or_else(|| TripError::not_found("Checklist", title))?;
        let item = checklist
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| TripError::not_found("ChecklistItem", item_id))?;
        item.completed = completed;
        self.touch();
        Ok(())
    }

    /// Record the share token; the token is generated by the caller
    ///
    /// Does nothing if the trip is already shared, preserving the original
    /// token.
    pub fn mark_shared(&mut self, token: String) {
        if self.is_shared {
            return;
        }
        self.is_shared = true;
        self.share_token = Some(token);
        self.touch();
    }

    /// Check the aggregate's structural invariants
    ///
    /// Intended for tests and store diagnostics: day numbers in range, no
    /// activity referenced by more than one day, share token present iff
    /// shared, and notes/checklists only on activities the day owns.
    pub fn verify_invariants(&self) -> TripResult<()> {
        let mut seen = std::collections::HashSet::new();
        for (key, day) in &self.itinerary {
            if *key != day.day {
                return Err(TripError::validation(format!(
                    "itinerary key {key} does not match day number {}",
                    day.day
                )));
            }
            self.validate_day(day.day)?;
            for id in &day.activities {
                if !seen.insert(*id) {
                    return Err(TripError::validation(format!(
                        "activity {id} referenced by more than one day"
                    )));
                }
            }
            for id in day.notes.keys() {
                if !day.contains(*id) {
                    return Err(TripError::validation(format!(
                        "note attached to activity {id} not on day {}",
                        day.day
                    )));
                }
            }
            for checklist in &day.checklists {
                if !day.contains(checklist.activity_id) {
                    return Err(TripError::validation(format!(
                        "checklist attached to activity {} not on day {}",
                        checklist.activity_id, day.day
                    )));
                }
            }
        }
        if self.is_shared != self.share_token.is_some() {
            return Err(TripError::validation(
                "share token must be present exactly when the trip is shared",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coast_run() -> Trip {
        Trip::new(
            UserId::new(),
            "Coast Run",
            "Galle",
            vec!["2025-12-01".to_string(), "2025-12-02".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_validates_inputs() {
        let owner = UserId::new();
        assert!(Trip::new(owner, "", "Galle", vec!["d".into()], None).is_err());
        assert!(Trip::new(owner, "Coast Run", "", vec!["d".into()], None).is_err());
        assert!(Trip::new(owner, "Coast Run", "Galle", vec![], None).is_err());
        assert!(Trip::new(owner, "Coast Run", "Galle", vec!["d".into()], Some(-1.0)).is_err());
        assert!(Trip::new(owner, "Coast Run", "Galle", vec!["d".into()], Some(0.0)).is_ok());
    }

    #[test]
    fn test_day_bounds_enforced() {
        let mut trip = coast_run();
        assert!(trip.add_activity_to_day(0, ActivityId::new()).is_err());
        assert!(trip.add_activity_to_day(3, ActivityId::new()).is_err());
        assert!(trip.add_activity_to_day(2, ActivityId::new()).is_ok());
        trip.verify_invariants().unwrap();
    }

    #[test]
    fn test_day_date_is_snapshot() {
        let mut trip = coast_run();
        trip.add_activity_to_day(1, ActivityId::new()).unwrap();
        assert_eq!(trip.day(1).unwrap().date(), "2025-12-01");

        trip.apply_update(TripUpdate {
            dates: Some(vec!["2026-01-10".to_string(), "2026-01-11".to_string()]),
            ..Default::default()
        })
        .unwrap();

        // snapshot semantics: the day keeps its original date
        assert_eq!(trip.day(1).unwrap().date(), "2025-12-01");
    }

    #[test]
    fn test_update_rejects_empty_dates_and_keeps_state() {
        let mut trip = coast_run();
        let before = trip.dates().to_vec();
        let err = trip
            .apply_update(TripUpdate {
                dates: Some(vec![]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TripError::Validation(_)));
        assert_eq!(trip.dates(), before.as_slice());
    }

    #[test]
    fn test_update_rejects_dates_shorter_than_itinerary() {
        let mut trip = coast_run();
        trip.add_activity_to_day(2, ActivityId::new()).unwrap();
        let err = trip
            .apply_update(TripUpdate {
                dates: Some(vec!["2025-12-01".to_string()]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TripError::Validation(_)));
        assert_eq!(trip.dates().len(), 2);
    }

    #[test]
    fn test_update_merges_only_provided_fields() {
        let mut trip = coast_run();
        trip.apply_update(TripUpdate {
            budget: Some(1500.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(trip.name(), "Coast Run");
        assert_eq!(trip.destination(), "Galle");
        assert_eq!(trip.budget(), Some(1500.0));
    }

    #[test]
    fn test_remove_activity_not_found_leaves_day_unchanged() {
        let mut trip = coast_run();
        let kept = ActivityId::new();
        trip.add_activity_to_day(1, kept).unwrap();

        let err = trip
            .remove_activity_from_day(1, ActivityId::new())
            .unwrap_err();
        assert!(matches!(err, TripError::NotFound { .. }));
        assert_eq!(trip.day(1).unwrap().activities(), &[kept]);

        let err = trip.remove_activity_from_day(2, kept).unwrap_err();
        assert!(matches!(err, TripError::NotFound { .. }));
    }

    #[test]
    fn test_remove_activity_drops_its_annotations() {
        let mut trip = coast_run();
        let activity = ActivityId::new();
        trip.add_activity_to_day(1, activity).unwrap();
        trip.upsert_note(activity, "Packing", "bring sunscreen")
            .unwrap();
        trip.add_checklist_items(activity, "Gear", vec!["towel".to_string()])
            .unwrap();

        trip.remove_activity_from_day(1, activity).unwrap();
        let day = trip.day(1).unwrap();
        assert!(day.note_for(activity).is_none());
        assert_eq!(day.checklists_for(activity).count(), 0);
        trip.verify_invariants().unwrap();
    }

    #[test]
    fn test_bucket_item_name_trimmed() {
        let mut trip = coast_run();
        let item = trip
            .add_bucket_item("  Whale watching  ", None, None, None)
            .unwrap();
        assert_eq!(item.name, "Whale watching");
        assert!(!item.confirmed);

        let err = trip.add_bucket_item("   ", None, None, None).unwrap_err();
        assert!(matches!(err, TripError::Validation(_)));
    }

    #[test]
    fn test_note_replaces_previous() {
        let mut trip = coast_run();
        let activity = ActivityId::new();
        trip.add_activity_to_day(1, activity).unwrap();

        trip.upsert_note(activity, "Packing", "v1").unwrap();
        trip.upsert_note(activity, "Packing", "v2").unwrap();

        let note = trip.day(1).unwrap().note_for(activity).unwrap();
        assert_eq!(note.content, "v2");
    }

    #[test]
    fn test_checklist_append_and_toggle() {
        let mut trip = coast_run();
        let activity = ActivityId::new();
        trip.add_activity_to_day(1, activity).unwrap();

        trip.add_checklist_items(activity, "Gear", vec!["towel".to_string()])
            .unwrap();
        let checklist = trip
            .add_checklist_items(activity, "Gear", vec!["mask".to_string(), "fins".to_string()])
            .unwrap();
        assert_eq!(checklist.items.len(), 3);
        assert!(checklist.items.iter().all(|i| !i.completed));

        let item_id = checklist.items[1].id;
        trip.set_checklist_item(activity, "Gear", item_id, true)
            .unwrap();
        let day = trip.day(1).unwrap();
        let checklist = day.checklists_for(activity).next().unwrap();
        assert!(checklist.items[1].completed);

        let err = trip
            .set_checklist_item(activity, "Missing", item_id, true)
            .unwrap_err();
        assert!(matches!(err, TripError::NotFound { .. }));
    }

    #[test]
    fn test_mark_shared_is_idempotent() {
        let mut trip = coast_run();
        trip.mark_shared("token-a".to_string());
        trip.mark_shared("token-b".to_string());
        assert!(trip.is_shared());
        assert_eq!(trip.share_token(), Some("token-a"));
        trip.verify_invariants().unwrap();
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let mut trip = coast_run();
        let a = ActivityId::new();
        let b = ActivityId::new();
        trip.add_activity_to_day(1, a).unwrap();
        trip.add_activity_to_day(1, b).unwrap();

        assert!(trip.reorder_day(1, vec![b, a]).is_ok());
        assert_eq!(trip.day(1).unwrap().activities(), &[b, a]);

        let err = trip.reorder_day(1, vec![a]).unwrap_err();
        assert!(matches!(err, TripError::Validation(_)));
        let err = trip.reorder_day(2, vec![]).unwrap_err();
        assert!(matches!(err, TripError::NotFound { .. }));
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let mut trip = coast_run();
        let activity = ActivityId::new();
        trip.add_activity_to_day(1, activity).unwrap();
        trip.upsert_note(activity, "Packing", "bring sunscreen")
            .unwrap();
        trip.add_bucket_item("Fort walk", None, None, None).unwrap();
        trip.mark_shared("deadbeef".to_string());

        let json = serde_json::to_string(&trip).unwrap();
        let back: Trip = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trip);
        back.verify_invariants().unwrap();
    }
}
