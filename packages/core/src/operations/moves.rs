//! Move Operations
//!
//! Pure planning of reorders inside an already reconstructed chain. Applying
//! the returned updates is the persistence layer's job.

use serde::{Deserialize, Serialize};

use crate::models::ChainEntity;
use crate::operations::error::ChainOperationError;
use crate::operations::plan::{plan_transition, position_of, ReorderPlan};

/// Direction for [`move_adjacent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards the head
    Up,
    /// Towards the tail
    Down,
}

/// Swap an entity with its neighbour in `direction`.
///
/// Moving the head up or the tail down is a no-op and returns an empty plan.
/// On a well-formed chain at most four entities are touched: the pair being
/// swapped plus their outer neighbours.
///
/// # Errors
///
/// `EntityNotFound` if `entity_id` is not in `ordered`.
pub fn move_adjacent<E: ChainEntity>(
    ordered: &[E],
    entity_id: &str,
    direction: MoveDirection,
) -> Result<ReorderPlan, ChainOperationError> {
    let current = position_of(ordered, entity_id)
        .ok_or_else(|| ChainOperationError::entity_not_found(entity_id))?;

    let target = match direction {
        MoveDirection::Up if current == 0 => return Ok(ReorderPlan::default()),
        MoveDirection::Up => current - 1,
        MoveDirection::Down if current + 1 >= ordered.len() => return Ok(ReorderPlan::default()),
        MoveDirection::Down => current + 1,
    };

    Ok(plan_move(ordered, current, target))
}

/// Move an entity so that it lands at `target_index`.
///
/// The index is interpreted after removing the entity from its current
/// position: it is spliced in before the entity now at `target_index`, or
/// appended as the new tail when `target_index` equals the shortened length.
/// Moving to the current index is a no-op.
///
/// # Errors
///
/// - `EntityNotFound` if `entity_id` is not in `ordered`
/// - `InvalidTargetIndex` if `target_index >= ordered.len()`
pub fn move_to_index<E: ChainEntity>(
    ordered: &[E],
    entity_id: &str,
    target_index: usize,
) -> Result<ReorderPlan, ChainOperationError> {
    let current = position_of(ordered, entity_id)
        .ok_or_else(|| ChainOperationError::entity_not_found(entity_id))?;

    if target_index >= ordered.len() {
        return Err(ChainOperationError::invalid_target_index(
            target_index,
            ordered.len(),
        ));
    }

    if target_index == current {
        return Ok(ReorderPlan::default());
    }

    Ok(plan_move(ordered, current, target_index))
}

fn plan_move<E: ChainEntity>(ordered: &[E], from: usize, to: usize) -> ReorderPlan {
    let mut desired: Vec<&E> = ordered.iter().collect();
    let moved = desired.remove(from);
    desired.insert(to, moved);
    plan_transition(&desired)
}
