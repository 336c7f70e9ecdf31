//! Database Layer
//!
//! The persistence boundary of the ordering core:
//!
//! - [`ChainStore`] - async trait over the CRUD backend
//! - [`MemoryStore`] - in-memory implementation for tests and tooling
//! - [`DomainEvent`] - change notifications emitted after writes
//!
//! The backend guarantees neither ordering on fetch nor link consistency;
//! both are handled above this layer.

mod chain_store;
mod error;
pub mod events;
mod memory_store;

pub use chain_store::ChainStore;
pub use error::DatabaseError;
pub use events::{ChainEvent, DomainEvent};
pub use memory_store::MemoryStore;
