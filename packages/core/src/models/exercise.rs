//! Exercise Model
//!
//! Exercises belong to a module and are ordered within it the same way modules
//! are ordered within a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chain_entity::impl_chain_entity;

/// Publication state of an exercise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// An exercise inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,

    /// Owning module
    pub module_id: String,

    pub title: String,

    /// Markdown statement shown to students
    #[serde(default)]
    pub statement: String,

    #[serde(default)]
    pub status: ExerciseStatus,

    #[serde(default)]
    pub previous_id: Option<String>,

    #[serde(default)]
    pub next_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    /// Create an unlinked draft exercise with a generated UUID
    pub fn new(module_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), module_id, title)
    }

    pub fn new_with_id(
        id: impl Into<String>,
        module_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            module_id: module_id.into(),
            title: title.into(),
            statement: String::new(),
            status: ExerciseStatus::Draft,
            previous_id: None,
            next_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = statement.into();
        self
    }

    pub fn with_status(mut self, status: ExerciseStatus) -> Self {
        self.status = status;
        self
    }

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

impl_chain_entity!(Exercise, module_id);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParentScoped;

    #[test]
    fn test_exercise_defaults() {
        let exercise = Exercise::new("module-1", "Borrow checker drills");
        assert_eq!(exercise.status, ExerciseStatus::Draft);
        assert_eq!(exercise.parent_id(), "module-1");
        assert!(exercise.statement.is_empty());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let exercise = Exercise::new_with_id("e1", "m1", "Lifetimes")
            .with_status(ExerciseStatus::Published);
        let value = serde_json::to_value(&exercise).unwrap();
        assert_eq!(value["status"], "published");
        assert_eq!(value["moduleId"], "m1");
    }

    #[test]
    fn test_missing_status_defaults_to_draft() {
        let json = r#"{
            "id": "e1",
            "moduleId": "m1",
            "title": "Traits",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.status, ExerciseStatus::Draft);
        assert_eq!(exercise.previous_id, None);
    }
}
