//! Business Services
//!
//! - `ChainService` - fetch / reconstruct / plan / persist flow for module and
//!   exercise chains
//! - `ChainServiceConfig` - service tuning (mutation serialization, post-write
//!   verification)
//!
//! Services coordinate between the store and the pure chain operations.

pub mod chain_service;
pub mod config;
pub mod error;

pub use chain_service::ChainService;
pub use config::ChainServiceConfig;
pub use error::ChainServiceError;
