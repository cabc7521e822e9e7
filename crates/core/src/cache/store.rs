//! On-disk entry storage.
//!
//! One file per key directly under the cache directory. The file's
//! modification time is the "populated at" time of record.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::key::CacheKey;
use crate::Error;

/// Prefix for in-flight temporary files. Keys never contain `.`.
const TMP_PREFIX: &str = ".tmp-";

/// Entry files under a single cache directory.
#[derive(Debug, Clone)]
pub struct EntryStore {
    dir: PathBuf,
}

impl EntryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    /// Create the cache directory tree. Idempotent.
    pub async fn ensure_dir(&self) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::storage(&self.dir, e))
    }

    /// Age of the entry for `key` relative to `now`, or `None` if absent.
    ///
    /// A modification time ahead of `now` yields zero.
    pub async fn probe(&self, key: &CacheKey, now: SystemTime) -> Result<Option<Duration>, Error> {
        let path = self.path_for(key);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(path, e)),
        };

        let modified = metadata.modified().map_err(|e| Error::storage(&path, e))?;
        Ok(Some(now.duration_since(modified).unwrap_or(Duration::ZERO)))
    }

    /// Stored content for `key`, or `None` if it disappeared since probing.
    pub async fn read(&self, key: &CacheKey) -> Result<Option<String>, Error> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(path, e)),
        }
    }

    /// Replace the entry for `key` with `content`.
    ///
    /// Writes to a temporary file in the cache directory and renames it over
    /// the entry, so a failed write leaves any prior entry intact.
    pub async fn write(&self, key: &CacheKey, content: &str) -> Result<(), Error> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let content = content.to_owned();
        let len = content.len();

        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            let mut tmp = tempfile::Builder::new()
                .prefix(TMP_PREFIX)
                .tempfile_in(&dir)
                .map_err(|e| Error::storage(&dir, e))?;
            tmp.write_all(content.as_bytes())
                .map_err(|e| Error::storage(tmp.path(), e))?;
            tmp.persist(&path).map_err(|e| Error::storage(&path, e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::storage(&self.dir, std::io::Error::other(e)))??;

        tracing::debug!("wrote cache entry {} ({} bytes)", key, len);
        Ok(())
    }
}
