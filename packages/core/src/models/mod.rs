//! Data Models
//!
//! This module contains the entities that take part in chain ordering:
//!
//! - `ChainEntity` / `ChainEntityMut` / `ParentScoped` - capability traits the
//!   ordering algorithms and stores depend on
//! - `CourseModule` - ordered within a course
//! - `Exercise` - ordered within a module
//! - `ChainRecord` - payload-agnostic record for raw backend snapshots

mod chain_entity;
mod chain_record;
mod course_module;
mod exercise;

pub use chain_entity::{ChainEntity, ChainEntityMut, ParentScoped};
pub use chain_record::ChainRecord;
pub use course_module::CourseModule;
pub use exercise::{Exercise, ExerciseStatus};
