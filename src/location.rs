// Copyright 2025 Cowboy AI, LLC.

//! Location search collaborator boundary
//!
//! Place search and geocoding are provided by an external service; this
//! crate only defines the adapter trait it is consumed through. Implementors
//! should map transport failures and timeouts to `TripError::Dependency`.

use crate::TripResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One place returned by the external search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    /// Display name of the place
    pub name: String,
    /// Short description, when the provider has one
    pub description: Option<String>,
    /// Address text
    pub address: Option<String>,
    /// Photo URL
    pub photo_url: Option<String>,
    /// Provider rating
    pub rating: Option<f32>,
    /// Provider-scoped place identifier
    pub place_id: Option<String>,
    /// Latitude, when the provider geocodes the place
    pub lat: Option<f64>,
    /// Longitude, when the provider geocodes the place
    pub lon: Option<f64>,
}

/// Adapter to an external place-search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Search places matching a free-text query
    async fn search(&self, query: &str, limit: usize) -> TripResult<Vec<PlaceResult>>;
}
