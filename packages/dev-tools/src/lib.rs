//! Development tooling for the classroom ordering core
//!
//! - [`doctor`] - offline inspection and repair planning for chain snapshots

pub mod doctor;
