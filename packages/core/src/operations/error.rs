//! Error types for chain operations
//!
//! Only caller misuse is an error here. Malformed stored links are absorbed by
//! reconstruction and surfaced through `ChainDiagnostics`.

use thiserror::Error;

/// Errors raised by move, insert and remove planning
///
/// These indicate the caller passed an inconsistent `(ordered, entity_id)`
/// pair; they must be fixed at the call site, not retried.
///
/// # Examples
///
/// ```rust
/// use classroom_core::operations::ChainOperationError;
///
/// let err = ChainOperationError::invalid_target_index(7, 3);
/// assert_eq!(err.to_string(), "Target index 7 out of range for chain of length 3");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainOperationError {
    /// The entity is not part of the supplied ordered list
    #[error("Entity '{entity_id}' is not in the chain")]
    EntityNotFound { entity_id: String },

    /// `move_to_index` target outside `0..len`
    #[error("Target index {index} out of range for chain of length {len}")]
    InvalidTargetIndex { index: usize, len: usize },

    /// Inserting an entity whose id is already in the chain
    #[error("Entity '{entity_id}' is already in the chain")]
    DuplicateEntity { entity_id: String },
}

impl ChainOperationError {
    pub fn entity_not_found(entity_id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity_id: entity_id.into(),
        }
    }

    pub fn invalid_target_index(index: usize, len: usize) -> Self {
        Self::InvalidTargetIndex { index, len }
    }

    pub fn duplicate_entity(entity_id: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            entity_id: entity_id.into(),
        }
    }
}
