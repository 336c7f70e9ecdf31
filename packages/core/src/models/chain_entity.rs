//! Chain Capability Traits
//!
//! The ordering algorithms never look at concrete payload types. They depend on
//! the narrow capability set below, so modules, exercises and any record fetched
//! from the backend can share one implementation of the chain semantics.
//!
//! # Link Semantics
//!
//! - `previous_id = None` means "I am the head"
//! - `next_id = None` means "I am the tail"
//! - A link pointing at an id that is not in the fetched collection is treated
//!   exactly like an absent link during reconstruction

use chrono::{DateTime, Utc};

/// Read access to the ordering fields of an entity.
pub trait ChainEntity {
    /// Stable unique identifier
    fn id(&self) -> &str;

    /// Entity immediately before this one, if any
    fn previous_id(&self) -> Option<&str>;

    /// Entity immediately after this one, if any
    fn next_id(&self) -> Option<&str>;

    /// Creation timestamp, used for the fallback order
    fn created_at(&self) -> DateTime<Utc>;
}

/// Write access to the ordering fields, used when applying link updates.
pub trait ChainEntityMut: ChainEntity {
    fn set_previous_id(&mut self, previous_id: Option<String>);

    fn set_next_id(&mut self, next_id: Option<String>);
}

/// Entities that belong to exactly one parent collection (a course for
/// modules, a module for exercises).
///
/// Only stores and services use this; reconstruction never filters by parent.
pub trait ParentScoped {
    fn parent_id(&self) -> &str;
}

impl<T: ChainEntity + ?Sized> ChainEntity for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn previous_id(&self) -> Option<&str> {
        (**self).previous_id()
    }

    fn next_id(&self) -> Option<&str> {
        (**self).next_id()
    }

    fn created_at(&self) -> DateTime<Utc> {
        (**self).created_at()
    }
}

/// Implements the chain traits for a struct with `id`, `previous_id`,
/// `next_id`, `created_at` fields and the named parent field.
macro_rules! impl_chain_entity {
    ($ty:ty, $parent:ident) => {
        impl $crate::models::ChainEntity for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn previous_id(&self) -> Option<&str> {
                self.previous_id.as_deref()
            }

            fn next_id(&self) -> Option<&str> {
                self.next_id.as_deref()
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }
        }

        impl $crate::models::ChainEntityMut for $ty {
            fn set_previous_id(&mut self, previous_id: Option<String>) {
                self.previous_id = previous_id;
            }

            fn set_next_id(&mut self, next_id: Option<String>) {
                self.next_id = next_id;
            }
        }

        impl $crate::models::ParentScoped for $ty {
            fn parent_id(&self) -> &str {
                &self.$parent
            }
        }
    };
}

pub(crate) use impl_chain_entity;
