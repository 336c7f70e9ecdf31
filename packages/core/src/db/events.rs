//! Domain Events for chain mutations
//!
//! `ChainService` emits these on a tokio broadcast channel after every
//! successful write, so a rendering layer can patch local state or re-fetch
//! instead of polling.
//!
//! # Event Flow
//!
//! 1. ChainService plans a mutation and persists it through the store
//! 2. A domain event is sent on the broadcast channel
//! 3. All subscribers receive it; lagging subscribers may miss events

use serde::Serialize;

use crate::operations::{ChainDiagnostics, LinkUpdate};

/// What changed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChainEvent {
    /// A new entity was attached to a chain
    #[serde(rename = "entity:created")]
    EntityCreated {
        #[serde(rename = "parentId")]
        parent_id: String,
        #[serde(rename = "entityId")]
        entity_id: String,
    },

    /// Link fields were rewritten (move, insert, delete or repair)
    #[serde(rename = "links:updated")]
    LinksUpdated {
        #[serde(rename = "parentId")]
        parent_id: String,
        updates: Vec<LinkUpdate>,
    },

    /// An entity was removed and its neighbours relinked
    #[serde(rename = "entity:deleted")]
    EntityDeleted {
        #[serde(rename = "parentId")]
        parent_id: String,
        #[serde(rename = "entityId")]
        entity_id: String,
    },

    /// Stored links were rewritten to match the reconstructed order
    #[serde(rename = "chain:repaired")]
    ChainRepaired {
        #[serde(rename = "parentId")]
        parent_id: String,
        diagnostics: ChainDiagnostics,
    },
}

/// Event plus the client that caused it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    #[serde(flatten)]
    pub event: ChainEvent,

    /// Lets clients filter out their own events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_client_id: Option<String>,
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self.event {
            ChainEvent::EntityCreated { .. } => "entity:created",
            ChainEvent::LinksUpdated { .. } => "links:updated",
            ChainEvent::EntityDeleted { .. } => "entity:deleted",
            ChainEvent::ChainRepaired { .. } => "chain:repaired",
        }
    }

    pub fn parent_id(&self) -> &str {
        match &self.event {
            ChainEvent::EntityCreated { parent_id, .. }
            | ChainEvent::LinksUpdated { parent_id, .. }
            | ChainEvent::EntityDeleted { parent_id, .. }
            | ChainEvent::ChainRepaired { parent_id, .. } => parent_id,
        }
    }
}
