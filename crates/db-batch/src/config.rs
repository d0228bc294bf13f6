use anyhow::Context;
use serde::{Deserialize, Serialize};

// Configuration constants
pub(crate) const DEFAULT_MAX_KEY_SIZE: usize = 64 * 1024;
pub(crate) const DEFAULT_MAX_VALUE_SIZE: usize = 32 * 1024 * 1024;

/// Durability options applied when a batch is written to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Flush the engine to disk after every applied batch.
    #[serde(default)]
    pub sync: bool,
}

impl WriteOptions {
    pub fn new(sync: bool) -> Self {
        Self { sync }
    }
}

/// Store-wide limits on the shape of keys and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvLimits {
    pub max_key_size: usize,
    pub max_value_size: usize,
}

impl Default for KvLimits {
    fn default() -> Self {
        Self {
            max_key_size: DEFAULT_MAX_KEY_SIZE,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub write_options: WriteOptions,
    pub limits: KvLimits,
}

impl StoreConfig {
    pub fn new(write_options: WriteOptions, limits: KvLimits) -> Self {
        Self {
            write_options,
            limits,
        }
    }

    /// Create production configuration, syncing every committed batch.
    pub fn production() -> Self {
        Self::new(WriteOptions::new(true), KvLimits::default())
    }

    /// Create test configuration, without the fsync on every commit.
    pub fn test() -> Self {
        Self::new(WriteOptions::new(false), KvLimits::default())
    }

    /// Parses a configuration from a TOML document. Missing fields take production defaults.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("parsing store config")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_full() {
        let cfg = StoreConfig::from_toml_str(
            r#"
            [write_options]
            sync = false

            [limits]
            max_key_size = 128
            max_value_size = 1024
            "#,
        )
        .unwrap();

        assert!(!cfg.write_options.sync);
        assert_eq!(cfg.limits.max_key_size, 128);
        assert_eq!(cfg.limits.max_value_size, 1024);
    }

    #[test]
    fn test_from_toml_defaults() {
        let cfg = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, StoreConfig::production());

        let cfg = StoreConfig::from_toml_str("[limits]\nmax_key_size = 16\n").unwrap();
        assert!(cfg.write_options.sync);
        assert_eq!(cfg.limits.max_key_size, 16);
        assert_eq!(cfg.limits.max_value_size, DEFAULT_MAX_VALUE_SIZE);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert!(StoreConfig::from_toml_str("[write_options]\nsync = \"yes\"\n").is_err());
    }
}
