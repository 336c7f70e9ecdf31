//! Generic Chain Record
//!
//! Loosely-shaped record for snapshots whose payload is not known up front
//! (diagnostic tooling, backend dumps). Ordering fields are typed, everything
//! else is kept verbatim in `payload`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chain_entity::impl_chain_entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    pub id: String,

    pub parent_id: String,

    #[serde(default)]
    pub previous_id: Option<String>,

    #[serde(default)]
    pub next_id: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Remaining fields (title, description, timestamps, status, ...)
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl ChainRecord {
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            previous_id: None,
            next_id: None,
            created_at,
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_links(mut self, previous_id: Option<&str>, next_id: Option<&str>) -> Self {
        self.previous_id = previous_id.map(str::to_string);
        self.next_id = next_id.map(str::to_string);
        self
    }
}

impl_chain_entity!(ChainRecord, parent_id);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_fields_are_preserved() {
        let json = r#"{
            "id": "1",
            "parentId": "course-9",
            "previousId": null,
            "nextId": "2",
            "createdAt": "2025-03-01T10:00:00Z",
            "title": "Variables",
            "published": true
        }"#;
        let record: ChainRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.parent_id, "course-9");
        assert_eq!(record.payload["title"], "Variables");
        assert_eq!(record.payload["published"], true);
        assert!(!record.payload.contains_key("nextId"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["title"], "Variables");
        assert_eq!(back["nextId"], "2");
    }
}
