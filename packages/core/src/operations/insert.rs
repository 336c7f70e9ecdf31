//! Insertion, Removal and Relinking
//!
//! Creation-time and deletion-time chain mutations, plus the out-of-band repair
//! that rewrites stored links to match a reconstructed order.

use crate::models::ChainEntity;
use crate::operations::error::ChainOperationError;
use crate::operations::plan::{plan_transition, position_of, ReorderPlan};

/// Attach `new_entity` after the current tail.
///
/// With an empty chain the new entity becomes head and tail. Only link fields
/// whose stored value differs from the target are included, so a freshly
/// constructed (unlinked) entity appended to an empty chain yields an empty
/// plan.
///
/// Insertion at an arbitrary position is this followed by
/// [`move_to_index`](crate::operations::move_to_index).
///
/// # Errors
///
/// `DuplicateEntity` if an entity with the same id is already in `ordered`.
pub fn insert_at_tail<E: ChainEntity>(
    ordered: &[E],
    new_entity: &E,
) -> Result<ReorderPlan, ChainOperationError> {
    if position_of(ordered, new_entity.id()).is_some() {
        return Err(ChainOperationError::duplicate_entity(new_entity.id()));
    }

    let mut desired: Vec<&E> = ordered.iter().collect();
    desired.push(new_entity);
    Ok(plan_transition(&desired))
}

/// Unlink an entity that is about to be deleted, joining its former
/// neighbours directly. The removed entity itself receives no updates.
///
/// # Errors
///
/// `EntityNotFound` if `entity_id` is not in `ordered`.
pub fn remove_from_chain<E: ChainEntity>(
    ordered: &[E],
    entity_id: &str,
) -> Result<ReorderPlan, ChainOperationError> {
    let current = position_of(ordered, entity_id)
        .ok_or_else(|| ChainOperationError::entity_not_found(entity_id))?;

    let desired: Vec<&E> = ordered
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != current)
        .map(|(_, e)| e)
        .collect();
    Ok(plan_transition(&desired))
}

/// Rewrite every stored link so it agrees with `ordered`.
///
/// Used to repair a chain after reconstruction had to fall back or append
/// orphans. Empty for a chain that is already consistent.
pub fn relink<E: ChainEntity>(ordered: &[E]) -> ReorderPlan {
    let desired: Vec<&E> = ordered.iter().collect();
    plan_transition(&desired)
}
