//! Driver configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Limits and behavior shared by all drivers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Maximum number of buckets
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,
    /// Maximum object size in bytes
    #[serde(default = "default_max_object_size")]
    pub max_object_size: u64,
    /// Reject every mutating operation
    #[serde(default)]
    pub read_only: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_buckets: default_max_buckets(),
            max_object_size: default_max_object_size(),
            read_only: false,
        }
    }
}

fn default_max_buckets() -> usize {
    100
}

fn default_max_object_size() -> u64 {
    5 * 1024 * 1024 * 1024 // 5 GiB
}

impl DriverConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml_str(&content)?;
        info!("Loaded driver configuration from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: DriverConfig = toml::from_str(content)?;
        config.clamp();
        Ok(config)
    }

    fn clamp(&mut self) {
        if self.max_buckets == 0 {
            warn!("max_buckets is 0, using 1");
            self.max_buckets = 1;
        }
    }
}
