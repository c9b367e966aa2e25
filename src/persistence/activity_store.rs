// Copyright 2025 Cowboy AI, LLC.

//! Durable storage for individual activity records

use crate::{Activity, ActivityId, TripResult};
use async_trait::async_trait;

/// Storage for activity records, keyed by activity id
///
/// Activities are leaf records: days reference them by id and never embed
/// them. Implementations map their own failures to `TripError::Dependency`.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Insert or replace an activity record
    async fn put(&self, activity: Activity) -> TripResult<()>;

    /// Fetch one activity, `None` if absent
    async fn get(&self, id: ActivityId) -> TripResult<Option<Activity>>;

    /// Fetch several activities, preserving input order and skipping ids
    /// that no longer resolve
    async fn get_many(&self, ids: &[ActivityId]) -> TripResult<Vec<Activity>>;

    /// Delete an activity record; returns whether it existed
    async fn delete(&self, id: ActivityId) -> TripResult<bool>;
}
