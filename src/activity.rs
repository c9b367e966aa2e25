// Copyright 2025 Cowboy AI, LLC.

//! Activity records and their value objects
//!
//! An Activity is stored independently of the Trip document and referenced
//! by id from the owning itinerary day. Notes and checklists are addressed
//! per activity but live inside the Trip document (see `trip`).

use crate::{ActivityId, ChecklistItemId, TripError, TripResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of itinerary activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// A sight or point of interest
    Place,
    /// Accommodation
    Stay,
    /// Restaurant, cafe, or other meal stop
    Food,
    /// Anything done rather than visited
    Activity,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityType::Place => write!(f, "place"),
            ActivityType::Stay => write!(f, "stay"),
            ActivityType::Food => write!(f, "food"),
            ActivityType::Activity => write!(f, "activity"),
        }
    }
}

impl Default for ActivityType {
    fn default() -> Self {
        ActivityType::Activity
    }
}

impl FromStr for ActivityType {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place" => Ok(ActivityType::Place),
            "stay" => Ok(ActivityType::Stay),
            "food" => Ok(ActivityType::Food),
            "activity" => Ok(ActivityType::Activity),
            other => Err(TripError::validation(format!(
                "unknown activity type: {other}"
            ))),
        }
    }
}

/// A geographic coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl GeoPoint {
    /// Create a coordinate pair, rejecting values outside the valid ranges
    pub fn new(lat: f64, lon: f64) -> TripResult<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(TripError::validation(format!(
                "coordinates out of range: {lat},{lon}"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a `"lat,lon"` free-text location, as entered by clients
    ///
    /// Returns `None` for text that is not a coordinate pair; such locations
    /// are kept as free text and treated as fixed anchors by the route
    /// optimizer.
    pub fn parse(text: &str) -> Option<Self> {
        let (lat, lon) = text.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        Self::new(lat, lon).ok()
    }
}

/// An independently stored activity record
///
/// Owned by exactly one itinerary day at a time; deleting the owning
/// reference deletes this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier, referenced from the owning day
    pub id: ActivityId,
    /// What kind of stop this is
    pub kind: ActivityType,
    /// Display name, required and non-empty
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Rating in `[0, 5]`
    pub rating: Option<f32>,
    /// Free-text location or address
    pub location: Option<String>,
    /// Geographic coordinates, when known
    pub coordinates: Option<GeoPoint>,
    /// Optional clock time, e.g. `"09:30"`
    pub time: Option<String>,
}

/// Fields supplied by a caller when creating an activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityDraft {
    /// What kind of stop this is
    pub kind: ActivityType,
    /// Display name, required and non-empty
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Rating in `[0, 5]`
    pub rating: Option<f32>,
    /// Free-text location; `"lat,lon"` text also populates coordinates
    pub location: Option<String>,
    /// Optional clock time
    pub time: Option<String>,
}

impl Activity {
    /// Build a validated activity record from caller-supplied fields
    ///
    /// Coordinates are derived from the location text when it parses as a
    /// `"lat,lon"` pair.
    pub fn from_draft(draft: ActivityDraft) -> TripResult<Self> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(TripError::validation("activity name must not be empty"));
        }
        if let Some(rating) = draft.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(TripError::validation(format!(
                    "rating must be in [0, 5], got {rating}"
                )));
            }
        }
        let coordinates = draft.location.as_deref().and_then(GeoPoint::parse);
        Ok(Self {
            id: ActivityId::new(),
            kind: draft.kind,
            name: name.to_string(),
            description: draft.description,
            rating: draft.rating,
            location: draft.location,
            coordinates,
            time: draft.time,
        })
    }
}

/// A titled note attached to one activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note title
    pub title: String,
    /// Note body
    pub content: String,
}

/// A single checklist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique identifier within the checklist
    pub id: ChecklistItemId,
    /// Item text
    pub text: String,
    /// Whether the item has been checked off
    pub completed: bool,
}

impl ChecklistItem {
    /// Create a fresh unchecked item
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ChecklistItemId::new(),
            text: text.into(),
            completed: false,
        }
    }
}
