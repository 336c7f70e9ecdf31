//! Course Module Model
//!
//! A module is one ordered unit of a course. Modules of the same course form a
//! chain through `previous_id` / `next_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chain_entity::impl_chain_entity;

/// A module of a course, as returned by the backend.
///
/// # Examples
///
/// ```rust
/// use classroom_core::models::{ChainEntity, CourseModule};
///
/// let module = CourseModule::new("course-1", "Ownership basics");
/// assert!(module.previous_id().is_none());
/// assert!(module.next_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub id: String,

    /// Owning course
    pub course_id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub previous_id: Option<String>,

    #[serde(default)]
    pub next_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl CourseModule {
    /// Create an unlinked module with a generated UUID
    pub fn new(course_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), course_id, title)
    }

    /// Create an unlinked module with an explicit id
    pub fn new_with_id(
        id: impl Into<String>,
        course_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            course_id: course_id.into(),
            title: title.into(),
            description: String::new(),
            previous_id: None,
            next_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set both links at once (imports and test fixtures)
    pub fn with_links(mut self, previous_id: Option<&str>, next_id: Option<&str>) -> Self {
        self.previous_id = previous_id.map(str::to_string);
        self.next_id = next_id.map(str::to_string);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }
}

impl_chain_entity!(CourseModule, course_id);
