//! Configuration validation rules.

use crate::config::CacheConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl CacheConfig {
    /// Validate configuration values after loading.
    ///
    /// Negative TTLs are unrepresentable and rejected while loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `directory` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "directory".into(), reason: "must not be empty".into() });
        }

        if self.ttl_ms == 0 {
            tracing::warn!("ttl_ms is 0; every request will trigger a retrieval");
        }

        Ok(())
    }
}
