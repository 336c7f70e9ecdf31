//! Reorder Plans
//!
//! Every mutating operation is computed the same way: build the desired order,
//! then diff each entity's new positional neighbours against what it currently
//! stores. On a consistent chain that confines a move to its immediate
//! neighbourhood.

use serde::Serialize;

use crate::models::{ChainEntity, ChainEntityMut};
use crate::operations::link_update::{affected_entities, apply_link_updates, LinkUpdate};

/// Link updates realizing a new order. Empty means no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPlan {
    pub updates: Vec<LinkUpdate>,
}

impl ReorderPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Entities that need a persistence call, in first-touched order
    pub fn touched_entities(&self) -> Vec<&str> {
        affected_entities(&self.updates)
    }

    /// Patch a local snapshot with this plan
    pub fn apply_to<E: ChainEntityMut>(&self, entities: &mut [E]) -> usize {
        apply_link_updates(entities, &self.updates)
    }

    pub fn into_updates(self) -> Vec<LinkUpdate> {
        self.updates
    }
}

/// Diff `desired` against stored links.
///
/// Every entity whose stored `previous_id` / `next_id` disagrees with its
/// position in `desired` gets an update, so persisting the plan always
/// reconstructs to `desired`. On a consistent chain only the neighbourhood of
/// the change disagrees; on a malformed one the stale links are rewritten too.
pub(crate) fn plan_transition<E: ChainEntity>(desired: &[&E]) -> ReorderPlan {
    let mut updates = Vec::new();

    for (i, entity) in desired.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| desired[p].id());
        let next = desired.get(i + 1).map(|n| n.id());

        if entity.previous_id() != previous {
            updates.push(LinkUpdate::previous(entity.id(), previous));
        }
        if entity.next_id() != next {
            updates.push(LinkUpdate::next(entity.id(), next));
        }
    }

    if !updates.is_empty() {
        tracing::debug!("Planned {} link updates: {:?}", updates.len(), updates);
    }

    ReorderPlan { updates }
}

pub(crate) fn position_of<E: ChainEntity>(ordered: &[E], entity_id: &str) -> Option<usize> {
    ordered.iter().position(|e| e.id() == entity_id)
}
