// Copyright 2025 Cowboy AI, LLC.

//! Persistence boundary for trips and activities
//!
//! Trips persist as one document per aggregate; activities persist as
//! independent records referenced by id from day entries. Any durable store
//! with document semantics can sit behind these traits; the in-memory
//! implementations here back the tests and small deployments.

mod activity_store;
mod memory;
mod trip_repository;

pub use activity_store::ActivityStore;
pub use memory::{InMemoryActivityStore, InMemoryTripRepository};
pub use trip_repository::TripRepository;
