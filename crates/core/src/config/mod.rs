//! Cache configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGE_CACHE_*)
//! 2. TOML config file (if PAGE_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::strategy::RetrievalMode;

mod validation;

pub use validation::ConfigError;

/// Configuration for a [`crate::PageCache`] instance.
///
/// Immutable once the cache is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cache entries and the access log.
    ///
    /// Set via PAGE_CACHE_DIRECTORY environment variable.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Maximum age in milliseconds for an entry to be served without retrieval.
    ///
    /// Set via PAGE_CACHE_TTL_MS environment variable.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// How content is obtained on a cache miss.
    ///
    /// Set via PAGE_CACHE_MODE environment variable (`fetch` or `navigate`).
    #[serde(default)]
    pub mode: RetrievalMode,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_ttl_ms() -> u64 {
    15 * 60 * 1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { directory: default_directory(), ttl_ms: default_ttl_ms(), mode: RetrievalMode::default() }
    }
}

impl CacheConfig {
    /// TTL as Duration for freshness comparisons.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGE_CACHE_`
    /// 2. TOML file from `PAGE_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed (including a negative TTL)
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGE_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAGE_CACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.directory, PathBuf::from(".cache"));
        assert_eq!(config.ttl_ms, 900_000);
        assert_eq!(config.mode, RetrievalMode::Navigate);
    }

    #[test]
    fn test_ttl_duration() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_load_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("PAGE_CACHE_DIRECTORY", "/tmp/c");
            jail.set_env("PAGE_CACHE_TTL_MS", "1000");
            jail.set_env("PAGE_CACHE_MODE", "fetch");

            let config = CacheConfig::load().unwrap();
            assert_eq!(config.directory, PathBuf::from("/tmp/c"));
            assert_eq!(config.ttl_ms, 1000);
            assert_eq!(config.mode, RetrievalMode::Fetch);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("cache.toml", "directory = \"pages\"\nttl_ms = 5000\nmode = \"navigate\"\n")?;
            jail.set_env("PAGE_CACHE_CONFIG_FILE", "cache.toml");
            jail.set_env("PAGE_CACHE_TTL_MS", "7000");

            let config = CacheConfig::load().unwrap();
            assert_eq!(config.directory, PathBuf::from("pages"));
            assert_eq!(config.ttl_ms, 7000);
            assert_eq!(config.mode, RetrievalMode::Navigate);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_negative_ttl() {
        Jail::expect_with(|jail| {
            jail.set_env("PAGE_CACHE_TTL_MS", "-1");
            let result = CacheConfig::load();
            assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_unknown_mode() {
        Jail::expect_with(|jail| {
            jail.set_env("PAGE_CACHE_MODE", "teleport");
            let result = CacheConfig::load();
            assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
            Ok(())
        });
    }
}
