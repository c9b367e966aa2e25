// Copyright 2025 Cowboy AI, LLC.

//! Error types for trip domain operations

use thiserror::Error;

/// Errors that can occur in trip domain operations
///
/// Every fallible operation in this crate surfaces one of these four kinds.
/// Persistence adapters and external resolvers never leak their own error
/// types; they are wrapped into `Dependency`.
#[derive(Debug, Clone, Error)]
pub enum TripError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A trip, day, activity, bucket item, or checklist entry was not found,
    /// or is not owned by the caller
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        /// Kind of record that wasn't found
        entity_type: String,
        /// Identifier that was searched for
        id: String,
    },

    /// A collaborator (persistence, location search) was unreachable or
    /// timed out
    #[error("Dependency error: {service} - {message}")]
    Dependency {
        /// Name of the failing collaborator
        service: String,
        /// What went wrong
        message: String,
    },

    /// A retriable conflict was retried and exhausted
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl TripError {
    /// Validation failure with a descriptive message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Not-found failure for a record kind and id
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Dependency failure attributed to a named collaborator
    pub fn dependency(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Dependency {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for trip domain operations
pub type TripResult<T> = Result<T, TripError>;
