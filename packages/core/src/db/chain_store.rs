//! Persistence boundary for chain entities
//!
//! The backend is a plain CRUD store: it returns a parent's children in no
//! particular order and applies field-level link updates. This trait is the
//! seam `ChainService` depends on, so the same service runs against the
//! in-memory store in tests and against an HTTP backend in production.

use async_trait::async_trait;

use crate::db::DatabaseError;
use crate::models::{ChainEntityMut, ParentScoped};
use crate::operations::LinkUpdate;

/// Abstraction over the CRUD backend holding modules or exercises
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so services can be shared across
/// tokio tasks.
///
/// # Consistency
///
/// No locking or version tokens are assumed. Two clients writing the same
/// chain concurrently resolve last-writer-wins, which can leave duplicate
/// heads, cycles or orphans behind; reconstruction tolerates all of them.
#[async_trait]
pub trait ChainStore: Send + Sync {
    type Entity: ChainEntityMut + ParentScoped + Clone + Send + Sync + 'static;

    /// All children of `parent_id`, unordered
    async fn fetch_by_parent(&self, parent_id: &str) -> Result<Vec<Self::Entity>, DatabaseError>;

    /// Entity by id; `Ok(None)` if absent
    async fn get(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError>;

    /// Store a new entity as given (links included)
    ///
    /// # Errors
    ///
    /// `DuplicateId` if the id already exists.
    async fn insert(&self, entity: Self::Entity) -> Result<(), DatabaseError>;

    /// Apply link updates, one write per affected entity.
    ///
    /// Either all updates are applied or none: an update addressed to a
    /// missing entity fails the whole batch with `EntityNotFound`.
    async fn apply_link_updates(&self, updates: &[LinkUpdate]) -> Result<(), DatabaseError>;

    /// Remove an entity. Relinking its neighbours is the caller's job.
    async fn delete(&self, id: &str) -> Result<(), DatabaseError>;
}
