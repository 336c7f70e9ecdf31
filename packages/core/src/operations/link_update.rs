//! Link Updates
//!
//! A link update is one field-level change (`previousId` or `nextId` on one
//! entity). Operations return them; the persistence layer applies them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::ChainEntityMut;

/// Which ordering field an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkField {
    #[serde(rename = "previousId")]
    PreviousId,
    #[serde(rename = "nextId")]
    NextId,
}

impl LinkField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkField::PreviousId => "previousId",
            LinkField::NextId => "nextId",
        }
    }
}

/// Set `field` of entity `entity_id` to `value` (`None` clears the link)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkUpdate {
    pub entity_id: String,
    pub field: LinkField,
    pub value: Option<String>,
}

impl LinkUpdate {
    pub fn new(entity_id: impl Into<String>, field: LinkField, value: Option<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            field,
            value,
        }
    }

    pub fn previous(entity_id: impl Into<String>, value: Option<&str>) -> Self {
        Self::new(entity_id, LinkField::PreviousId, value.map(str::to_string))
    }

    pub fn next(entity_id: impl Into<String>, value: Option<&str>) -> Self {
        Self::new(entity_id, LinkField::NextId, value.map(str::to_string))
    }

    /// Apply this update to an entity, ignoring the entity id
    pub fn apply_to<E: ChainEntityMut + ?Sized>(&self, entity: &mut E) {
        match self.field {
            LinkField::PreviousId => entity.set_previous_id(self.value.clone()),
            LinkField::NextId => entity.set_next_id(self.value.clone()),
        }
    }
}

/// Apply updates to a local snapshot (optimistic patching).
///
/// Updates addressed to ids that are not in `entities` are skipped. Returns the
/// number of updates applied.
pub fn apply_link_updates<E: ChainEntityMut>(entities: &mut [E], updates: &[LinkUpdate]) -> usize {
    let mut applied = 0;
    for update in updates {
        match entities.iter_mut().find(|e| e.id() == update.entity_id) {
            Some(entity) => {
                update.apply_to(entity);
                applied += 1;
            }
            None => {
                tracing::debug!(
                    "Skipping link update for '{}': not in snapshot",
                    update.entity_id
                );
            }
        }
    }
    applied
}

/// Distinct entity ids touched by `updates`, in first-seen order
pub fn affected_entities(updates: &[LinkUpdate]) -> Vec<&str> {
    let mut seen = HashSet::new();
    updates
        .iter()
        .map(|u| u.entity_id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}
