//! Unified error types for pagecache.

use std::path::PathBuf;

use crate::browser::BrowserError;
use crate::config::ConfigError;

/// Unified error type for the cache engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The identifier is not a well-formed absolute URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Navigation or in-context fetch failed. Never cached.
    #[error("RETRIEVAL_FAILED: {0}")]
    Retrieval(#[from] BrowserError),

    /// Filesystem I/O on the cache directory failed.
    #[error("STORAGE_ERROR: {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage { path: path.into(), source }
    }

    /// Whether this error came from the browsing context rather than the cache itself.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Error::Retrieval(_))
    }
}
