//! Error taxonomy for core operations.
//!
//! Aggregation functions never fail; everything that can go wrong at the
//! request level is one of the four [`CoreError`] kinds.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the service, resolvers and session table.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or out-of-range input. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The acting scope is not allowed to perform the operation.
    #[error("scope violation: {0}")]
    ScopeViolation(String),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The underlying store failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`CoreError::Validation`].
    pub fn validation(reason: impl Into<String>) -> Self {
        CoreError::Validation(reason.into())
    }

    /// Shorthand for a [`CoreError::ScopeViolation`].
    pub fn scope(reason: impl Into<String>) -> Self {
        CoreError::ScopeViolation(reason.into())
    }

    /// Whether the error originates from the store rather than the caller.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, CoreError::Store(_))
    }
}
