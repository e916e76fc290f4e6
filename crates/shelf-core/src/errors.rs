//! Cross-cutting error types for Shelf.
//!
//! This module defines errors that can originate from any crate in the system.
//! Storage errors (`DatabaseError`) live in `shelf-db`; a unified error for the
//! binary is deferred to `shelf-cli` where all crate errors converge.

use thiserror::Error;

/// Errors that can be raised by any Shelf crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A workflow transition was applied from a place that does not allow it.
    #[error("Invalid state transition: {entity} {id} from {from} via {transition}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        transition: String,
    },

    /// Input failed validation (missing fields, unknown place names).
    #[error("{0}")]
    Validation(String),

    /// The operation would break a circulation invariant.
    #[error("{0}")]
    Conflict(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a `NotFound` on a catalog holding.
    ///
    /// Holdings are called manifestations at the request boundary, so the
    /// message reads `Manifestation not found: <id>`.
    #[must_use]
    pub fn holding_not_found(identifier: &str) -> Self {
        Self::NotFound {
            entity: "Manifestation".to_string(),
            id: identifier.to_string(),
        }
    }

    #[must_use]
    pub fn member_not_found(identifier: &str) -> Self {
        Self::NotFound {
            entity: "Member".to_string(),
            id: identifier.to_string(),
        }
    }

    /// Whether the error is caused by the caller rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Validation(_) | Self::Conflict(_)
        )
    }
}
