//! Service Layer Error Types
//!
//! Wraps the hard errors of chain planning and the persistence errors of the
//! store into one type for callers of `ChainService`.

use crate::db::DatabaseError;
use crate::operations::ChainOperationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum ChainServiceError {
    /// Entity does not exist in the store at all
    #[error("Entity not found: {id}")]
    EntityNotFound { id: String },

    /// Entity exists but belongs to another parent's chain
    #[error("Entity '{entity_id}' belongs to '{actual_parent}', not '{expected_parent}'")]
    ParentMismatch {
        entity_id: String,
        expected_parent: String,
        actual_parent: String,
    },

    /// Caller passed an inconsistent (chain, entity, index) combination
    #[error("Chain operation rejected: {0}")]
    Operation(#[from] ChainOperationError),

    /// Persistence failed
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChainServiceError {
    pub fn entity_not_found(id: impl Into<String>) -> Self {
        Self::EntityNotFound { id: id.into() }
    }

    pub fn parent_mismatch(
        entity_id: impl Into<String>,
        expected_parent: impl Into<String>,
        actual_parent: impl Into<String>,
    ) -> Self {
        Self::ParentMismatch {
            entity_id: entity_id.into(),
            expected_parent: expected_parent.into(),
            actual_parent: actual_parent.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
