//! Database Error Types
//!
//! Error types for the persistence boundary. Service-level failures are
//! handled by `ChainServiceError`.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Entity does not exist in the store
    #[error("Entity not found: {id}")]
    EntityNotFound { id: String },

    /// Insert of an id that is already stored
    #[error("Entity already exists: {id}")]
    DuplicateId { id: String },

    /// Snapshot could not be read
    #[error("Failed to read snapshot at {}: {source}", path.display())]
    SnapshotRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot or payload could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend rejected or could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl DatabaseError {
    pub fn entity_not_found(id: impl Into<String>) -> Self {
        Self::EntityNotFound { id: id.into() }
    }

    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    pub fn snapshot_read(path: PathBuf, source: std::io::Error) -> Self {
        Self::SnapshotRead { path, source }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
