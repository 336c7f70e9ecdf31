//! Chain Operations
//!
//! Synchronous, pure algorithms over an in-memory snapshot of one parent's
//! children. Nothing here performs I/O; callers persist the returned
//! [`LinkUpdate`]s.
//!
//! - [`reconstruct_order`] - total order from `previous_id` / `next_id` links
//! - [`move_adjacent`] / [`move_to_index`] - reorder planning
//! - [`insert_at_tail`] / [`remove_from_chain`] - creation and deletion
//! - [`relink`] - rewrite stored links to match a reconstructed order

pub mod error;
mod insert;
pub mod link_update;
mod moves;
mod plan;
mod reconstruct;

pub use error::ChainOperationError;
pub use insert::{insert_at_tail, relink, remove_from_chain};
pub use link_update::{affected_entities, apply_link_updates, LinkField, LinkUpdate};
pub use moves::{move_adjacent, move_to_index, MoveDirection};
pub use plan::ReorderPlan;
pub use reconstruct::{
    reconstruct_ids, reconstruct_order, ChainDiagnostics, ChainOrder, FallbackReason, LinkRef,
};
