use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::exception::CacheError;

/// Capacity used when a config file leaves it unset.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Configuration for cache creation.
///
/// Loaded from TOML:
///
/// ```toml
/// capacity = 128
/// enable_stats = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub enable_stats: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            enable_stats: true,
        }
    }
}

impl CacheConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CacheError> {
        let config: CacheConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity < 1 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}
