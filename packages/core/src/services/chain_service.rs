//! Chain Service - fetch, plan, persist
//!
//! This module provides the consumer flow around the pure chain operations:
//!
//! - Reading: fetch a parent's children and reconstruct their order
//! - Creation: append at the tail, or append then move to an index
//! - Reordering: move up/down or to an arbitrary index
//! - Deletion: relink former neighbours, then delete
//! - Repair: rewrite stored links to match the reconstructed order
//!
//! # Consistency
//!
//! Every call works on a fresh snapshot; the reconstructed order is a derived
//! view and is never cached. Mutations of the same parent chain are serialized
//! through a per-parent lock (see [`ChainServiceConfig::serialize_mutations`]).
//! That only covers callers sharing this service instance: independent clients
//! writing to the same backend still resolve last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};
use tracing::instrument;

use crate::db::{ChainEvent, ChainStore, DomainEvent};
use crate::models::{ChainEntity, ParentScoped};
use crate::operations::{
    self, insert_at_tail, reconstruct_order, relink, remove_from_chain, ChainOperationError,
    ChainOrder, MoveDirection, ReorderPlan,
};
use crate::services::{ChainServiceConfig, ChainServiceError};

/// Broadcast channel capacity for domain events
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 256;

type ChainLocks = Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// Holds one parent's chain lock; removes the registry entry on release when
/// nobody else is holding or waiting for it.
struct ChainLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
    registry: ChainLocks,
    parent_id: String,
}

impl Drop for ChainLockGuard {
    fn drop(&mut self) {
        // Release first so the guard's reference no longer counts
        self.guard.take();

        let mut locks = self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Registry + this guard's handle: no waiters cloned it in the meantime
        let registered = locks
            .get(&self.parent_id)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock));
        if registered && Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.parent_id);
        }
    }
}

/// Ordering service over a [`ChainStore`]
///
/// # Examples
///
/// ```rust
/// # use classroom_core::db::MemoryStore;
/// # use classroom_core::models::{ChainEntity, CourseModule};
/// # use classroom_core::services::ChainService;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = ChainService::new(Arc::new(MemoryStore::new()));
///
/// service.append("course-1", CourseModule::new_with_id("m1", "course-1", "Intro")).await?;
/// service.append("course-1", CourseModule::new_with_id("m2", "course-1", "Traits")).await?;
///
/// let ordered = service.ordered_children("course-1").await?;
/// let ids: Vec<&str> = ordered.iter().map(|m| m.id()).collect();
/// assert_eq!(ids, vec!["m1", "m2"]);
/// # Ok(())
/// # }
/// ```
pub struct ChainService<S: ChainStore> {
    store: Arc<S>,
    config: ChainServiceConfig,
    chain_locks: ChainLocks,
    event_tx: broadcast::Sender<DomainEvent>,

    /// Stamped on emitted events as `source_client_id`
    client_id: Option<String>,
}

// Manual Clone: S itself need not be Clone
impl<S: ChainStore> Clone for ChainService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            chain_locks: self.chain_locks.clone(),
            event_tx: self.event_tx.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

impl<S: ChainStore> ChainService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, ChainServiceConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: ChainServiceConfig) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            config,
            chain_locks: Arc::new(StdMutex::new(HashMap::new())),
            event_tx,
            client_id: None,
        }
    }

    /// Copy of this service that tags its events with `client_id`.
    ///
    /// Shares the store, locks and event channel with the original.
    pub fn with_client(&self, client_id: impl Into<String>) -> Self {
        let mut service = self.clone();
        service.client_id = Some(client_id.into());
        service
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ChainServiceConfig {
        &self.config
    }

    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    // Send fails only without subscribers, which is fine
    fn emit_event(&self, event: ChainEvent) {
        let _ = self.event_tx.send(DomainEvent {
            event,
            source_client_id: self.client_id.clone(),
        });
    }

    /// Reconstructed order plus diagnostics for one parent
    #[instrument(skip(self))]
    pub async fn inspect(&self, parent_id: &str) -> Result<ChainOrder<S::Entity>, ChainServiceError> {
        let entities = self.store.fetch_by_parent(parent_id).await?;
        Ok(reconstruct_order(entities))
    }

    /// Children of `parent_id` in display order
    pub async fn ordered_children(&self, parent_id: &str) -> Result<Vec<S::Entity>, ChainServiceError> {
        Ok(self.inspect(parent_id).await?.into_entities())
    }

    /// Attach a new entity as the tail of `parent_id`'s chain.
    ///
    /// Returns the new display order.
    #[instrument(skip(self, entity))]
    pub async fn append(
        &self,
        parent_id: &str,
        entity: S::Entity,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        ensure_parent(parent_id, &entity)?;
        let _guard = self.lock_chain(parent_id).await;

        let ordered = self.ordered_children(parent_id).await?;
        let ordered = self.append_locked(parent_id, ordered, entity).await?;
        self.verify_after_write(parent_id, &ordered).await?;
        Ok(ordered)
    }

    /// Create an entity at `index` (append, then move).
    ///
    /// `index` may equal the current length, which is a plain append.
    #[instrument(skip(self, entity))]
    pub async fn insert_at(
        &self,
        parent_id: &str,
        entity: S::Entity,
        index: usize,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        ensure_parent(parent_id, &entity)?;
        let _guard = self.lock_chain(parent_id).await;

        let ordered = self.ordered_children(parent_id).await?;
        if index > ordered.len() {
            return Err(ChainOperationError::invalid_target_index(index, ordered.len()).into());
        }

        let entity_id = entity.id().to_string();
        let ordered = self.append_locked(parent_id, ordered, entity).await?;
        let ordered = self
            .move_to_index_locked(parent_id, ordered, &entity_id, index)
            .await?;
        self.verify_after_write(parent_id, &ordered).await?;
        Ok(ordered)
    }

    /// Swap an entity with its neighbour. Boundary moves change nothing.
    #[instrument(skip(self))]
    pub async fn move_adjacent(
        &self,
        parent_id: &str,
        entity_id: &str,
        direction: MoveDirection,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        let _guard = self.lock_chain(parent_id).await;

        let mut ordered = self.ordered_children(parent_id).await?;
        let plan = operations::move_adjacent(&ordered, entity_id, direction)?;
        if plan.is_empty() {
            return Ok(ordered);
        }

        self.persist(parent_id, &plan).await?;
        plan.apply_to(&mut ordered);

        if let Some(from) = ordered.iter().position(|e| e.id() == entity_id) {
            let to = match direction {
                MoveDirection::Up => from - 1,
                MoveDirection::Down => from + 1,
            };
            ordered.swap(from, to);
        }

        self.verify_after_write(parent_id, &ordered).await?;
        Ok(ordered)
    }

    /// Move an entity to `target_index` (post-removal indexing)
    #[instrument(skip(self))]
    pub async fn move_to_index(
        &self,
        parent_id: &str,
        entity_id: &str,
        target_index: usize,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        let _guard = self.lock_chain(parent_id).await;

        let ordered = self.ordered_children(parent_id).await?;
        let ordered = self
            .move_to_index_locked(parent_id, ordered, entity_id, target_index)
            .await?;
        self.verify_after_write(parent_id, &ordered).await?;
        Ok(ordered)
    }

    /// Relink the neighbours of `entity_id`, then delete it.
    ///
    /// # Errors
    ///
    /// - `EntityNotFound` if the entity is not stored
    /// - `ParentMismatch` if it is stored under another parent
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        parent_id: &str,
        entity_id: &str,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        let _guard = self.lock_chain(parent_id).await;

        let mut ordered = self.ordered_children(parent_id).await?;
        if !ordered.iter().any(|e| e.id() == entity_id) {
            return Err(match self.store.get(entity_id).await? {
                Some(other) => {
                    ChainServiceError::parent_mismatch(entity_id, parent_id, other.parent_id())
                }
                None => ChainServiceError::entity_not_found(entity_id),
            });
        }

        let plan = remove_from_chain(&ordered, entity_id)?;
        self.persist(parent_id, &plan).await?;
        self.store.delete(entity_id).await?;

        tracing::info!("Deleted '{}' from chain '{}'", entity_id, parent_id);
        self.emit_event(ChainEvent::EntityDeleted {
            parent_id: parent_id.to_string(),
            entity_id: entity_id.to_string(),
        });

        plan.apply_to(&mut ordered);
        ordered.retain(|e| e.id() != entity_id);
        self.verify_after_write(parent_id, &ordered).await?;
        Ok(ordered)
    }

    /// Rewrite the stored links of `parent_id`'s chain to match its
    /// reconstructed order. Returns the applied plan (empty if the chain was
    /// already consistent).
    #[instrument(skip(self))]
    pub async fn repair(&self, parent_id: &str) -> Result<ReorderPlan, ChainServiceError> {
        let _guard = self.lock_chain(parent_id).await;

        let order = self.inspect(parent_id).await?;
        let plan = relink(&order.entities);
        if plan.is_empty() {
            return Ok(plan);
        }

        self.store.apply_link_updates(&plan.updates).await?;
        tracing::info!(
            "Repaired chain '{}' with {} link updates",
            parent_id,
            plan.len()
        );
        self.emit_event(ChainEvent::ChainRepaired {
            parent_id: parent_id.to_string(),
            diagnostics: order.diagnostics,
        });
        Ok(plan)
    }

    async fn append_locked(
        &self,
        parent_id: &str,
        mut ordered: Vec<S::Entity>,
        mut entity: S::Entity,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        let plan = insert_at_tail(&ordered, &entity)?;

        // The new entity is written with its links; only neighbours need updates
        let (own, neighbours): (Vec<_>, Vec<_>) = plan
            .into_updates()
            .into_iter()
            .partition(|u| u.entity_id == entity.id());
        for update in &own {
            update.apply_to(&mut entity);
        }

        self.store.insert(entity.clone()).await?;
        self.emit_event(ChainEvent::EntityCreated {
            parent_id: parent_id.to_string(),
            entity_id: entity.id().to_string(),
        });

        let neighbours = ReorderPlan {
            updates: neighbours,
        };
        self.persist(parent_id, &neighbours).await?;
        neighbours.apply_to(&mut ordered);

        tracing::info!("Appended '{}' to chain '{}'", entity.id(), parent_id);
        ordered.push(entity);
        Ok(ordered)
    }

    async fn move_to_index_locked(
        &self,
        parent_id: &str,
        mut ordered: Vec<S::Entity>,
        entity_id: &str,
        target_index: usize,
    ) -> Result<Vec<S::Entity>, ChainServiceError> {
        let plan = operations::move_to_index(&ordered, entity_id, target_index)?;
        if plan.is_empty() {
            return Ok(ordered);
        }

        self.persist(parent_id, &plan).await?;
        plan.apply_to(&mut ordered);

        if let Some(from) = ordered.iter().position(|e| e.id() == entity_id) {
            let moved = ordered.remove(from);
            ordered.insert(target_index, moved);
        }
        Ok(ordered)
    }

    async fn persist(&self, parent_id: &str, plan: &ReorderPlan) -> Result<(), ChainServiceError> {
        if plan.is_empty() {
            return Ok(());
        }

        self.store.apply_link_updates(&plan.updates).await?;
        tracing::debug!(
            "Persisted {} link updates across {} entities in chain '{}'",
            plan.len(),
            plan.touched_entities().len(),
            parent_id
        );
        self.emit_event(ChainEvent::LinksUpdated {
            parent_id: parent_id.to_string(),
            updates: plan.updates.clone(),
        });
        Ok(())
    }

    /// Re-fetch and warn if the stored chain is malformed or does not
    /// reconstruct to `expected`
    async fn verify_after_write(
        &self,
        parent_id: &str,
        expected: &[S::Entity],
    ) -> Result<(), ChainServiceError> {
        if !self.config.verify_after_write {
            return Ok(());
        }

        let order = self.inspect(parent_id).await?;
        if order.is_repaired() {
            tracing::warn!(
                "Chain '{}' is still malformed after write: {:?}",
                parent_id,
                order.diagnostics
            );
        }

        let expected: Vec<&str> = expected.iter().map(|e| e.id()).collect();
        if order.ids() != expected {
            tracing::warn!(
                "Chain '{}' diverged after write: stored {:?}, expected {:?}",
                parent_id,
                order.ids(),
                expected
            );
        }
        Ok(())
    }

    /// Per-parent single-flight guard; `None` when serialization is disabled
    async fn lock_chain(&self, parent_id: &str) -> Option<ChainLockGuard> {
        if !self.config.serialize_mutations {
            return None;
        }

        let lock = {
            let mut locks = self
                .chain_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(parent_id.to_string()).or_default().clone()
        };
        let guard = lock.clone().lock_owned().await;
        Some(ChainLockGuard {
            guard: Some(guard),
            lock,
            registry: self.chain_locks.clone(),
            parent_id: parent_id.to_string(),
        })
    }
}

fn ensure_parent<E: ChainEntity + ParentScoped>(
    parent_id: &str,
    entity: &E,
) -> Result<(), ChainServiceError> {
    if entity.parent_id() != parent_id {
        return Err(ChainServiceError::parent_mismatch(
            entity.id(),
            parent_id,
            entity.parent_id(),
        ));
    }
    Ok(())
}
