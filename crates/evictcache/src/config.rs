//! Cache configuration

use std::fs;
use std::hash::Hash;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::error::Result;
use crate::policy::PolicyKind;

/// Default number of entries when a config omits `capacity`
pub const DEFAULT_CAPACITY: usize = 1024;

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Settings needed to build a [`Cache`]
///
/// ```json
/// { "capacity": 512, "policy": "lfu" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of entries; 0 disables caching
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Eviction strategy
    #[serde(default)]
    pub policy: PolicyKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: PolicyKind::default(),
        }
    }
}

impl CacheConfig {
    /// Parse a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Build an empty cache with these settings
    pub fn build<K, V>(&self) -> Cache<K, V>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        Cache::from_config(self)
    }
}
