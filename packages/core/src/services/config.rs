//! ChainService configuration
//!
//! Plain serde struct with defaults, loadable from JSON or the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::services::ChainServiceError;

/// Environment variable toggling per-chain mutation serialization
pub const ENV_SERIALIZE_MUTATIONS: &str = "CLASSROOM_SERIALIZE_MUTATIONS";

/// Environment variable toggling post-write verification
pub const ENV_VERIFY_AFTER_WRITE: &str = "CLASSROOM_VERIFY_AFTER_WRITE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainServiceConfig {
    /// Run mutations of the same parent chain one at a time (default: true)
    pub serialize_mutations: bool,

    /// Re-fetch after each write and warn if the stored chain is malformed
    /// (default: false)
    pub verify_after_write: bool,
}

impl Default for ChainServiceConfig {
    fn default() -> Self {
        Self {
            serialize_mutations: true,
            verify_after_write: false,
        }
    }
}

impl ChainServiceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ChainServiceError> {
        serde_json::from_str(json).map_err(|e| ChainServiceError::invalid_config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChainServiceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ChainServiceError::invalid_config(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by `CLASSROOM_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Unparseable values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = parse_flag(&lookup, ENV_SERIALIZE_MUTATIONS) {
            config.serialize_mutations = value;
        }
        if let Some(value) = parse_flag(&lookup, ENV_VERIFY_AFTER_WRITE) {
            config.verify_after_write = value;
        }
        config
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!("Ignoring {}={:?}: expected a boolean", key, other);
            None
        }
    }
}
