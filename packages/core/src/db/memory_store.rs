//! In-memory ChainStore
//!
//! Backs tests, the dev tools and embedders that have no backend. Entities are
//! kept in insertion order and returned in that order by
//! `fetch_by_parent`; callers must not rely on it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::sync::RwLock;

use crate::db::{ChainStore, DatabaseError};
use crate::models::{ChainEntityMut, ParentScoped};
use crate::operations::{affected_entities, LinkUpdate};

pub struct MemoryStore<E> {
    entities: RwLock<Vec<E>>,
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
        }
    }
}

impl<E> MemoryStore<E>
where
    E: ChainEntityMut + ParentScoped + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store verbatim, duplicates and broken links included
    pub fn with_entities(entities: Vec<E>) -> Self {
        Self {
            entities: RwLock::new(entities),
        }
    }

    /// Load a fetched JSON array snapshot
    pub fn from_json(json: &str) -> Result<Self, DatabaseError>
    where
        E: DeserializeOwned,
    {
        let entities: Vec<E> = serde_json::from_str(json)?;
        tracing::debug!("Loaded {} entities from JSON snapshot", entities.len());
        Ok(Self::with_entities(entities))
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatabaseError>
    where
        E: DeserializeOwned,
    {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DatabaseError::snapshot_read(path.to_path_buf(), e))?;
        Self::from_json(&json)
    }

    /// Every stored entity, in insertion order
    pub async fn snapshot(&self) -> Vec<E> {
        self.entities.read().await.clone()
    }

    /// Distinct parent ids, in first-seen order
    pub async fn parent_ids(&self) -> Vec<String> {
        let entities = self.entities.read().await;
        let mut parents: Vec<String> = Vec::new();
        for entity in entities.iter() {
            if !parents.iter().any(|p| p == entity.parent_id()) {
                parents.push(entity.parent_id().to_string());
            }
        }
        parents
    }
}

#[async_trait]
impl<E> ChainStore for MemoryStore<E>
where
    E: ChainEntityMut + ParentScoped + Clone + Send + Sync + 'static,
{
    type Entity = E;

    async fn fetch_by_parent(&self, parent_id: &str) -> Result<Vec<E>, DatabaseError> {
        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .filter(|e| e.parent_id() == parent_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<E>, DatabaseError> {
        let entities = self.entities.read().await;
        Ok(entities.iter().find(|e| e.id() == id).cloned())
    }

    async fn insert(&self, entity: E) -> Result<(), DatabaseError> {
        let mut entities = self.entities.write().await;
        if entities.iter().any(|e| e.id() == entity.id()) {
            return Err(DatabaseError::duplicate_id(entity.id()));
        }
        entities.push(entity);
        Ok(())
    }

    async fn apply_link_updates(&self, updates: &[LinkUpdate]) -> Result<(), DatabaseError> {
        let mut entities = self.entities.write().await;

        // Validate before touching anything so a bad batch leaves no partial writes
        for id in affected_entities(updates) {
            if !entities.iter().any(|e| e.id() == id) {
                return Err(DatabaseError::entity_not_found(id));
            }
        }

        for update in updates {
            // Seeded snapshots may hold duplicate ids; the first one is canonical
            if let Some(entity) = entities.iter_mut().find(|e| e.id() == update.entity_id) {
                update.apply_to(entity);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        let mut entities = self.entities.write().await;
        let before = entities.len();
        entities.retain(|e| e.id() != id);
        if entities.len() == before {
            return Err(DatabaseError::entity_not_found(id));
        }
        Ok(())
    }
}
