//! Classroom Ordering Core
//!
//! This crate reconstructs and reorders the per-parent chains of course
//! modules and exercises. Siblings are linked through `previous_id` /
//! `next_id` pointers rather than a rank, and the backend stores them as plain
//! records with no ordering or consistency guarantees.
//!
//! # Architecture
//!
//! - **Pure algorithms**: reconstruction and move planning are synchronous and
//!   never perform I/O
//! - **Derived order**: the display order is recomputed from every fetched
//!   snapshot, never cached
//! - **Soft repair**: malformed chains (cycles, broken links, duplicate ids)
//!   still yield a complete, deterministic order plus diagnostics
//!
//! # Modules
//!
//! - [`models`] - Entity capability traits, CourseModule, Exercise
//! - [`operations`] - Reconstruction, moves, insertion, relinking
//! - [`db`] - ChainStore persistence boundary and in-memory store
//! - [`services`] - ChainService (fetch, plan, persist)
//! - [`api`] - HTTP endpoints over ChainService

pub mod api;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use operations::{
    reconstruct_order, ChainDiagnostics, ChainOperationError, ChainOrder, LinkUpdate,
    MoveDirection, ReorderPlan,
};
pub use services::*;
