//! Disk-backed page content cache.
//!
//! This module provides a write-through cache in front of a browsing
//! context. It supports:
//!
//! - Keys derived with SHA-256, encoded as unpadded base64url
//! - Freshness from entry file modification time against a TTL
//! - Fetch or navigate retrieval on a miss
//! - An append-only access log of population events
//!
//! Concurrent misses for the same URL are not serialized: both retrieve,
//! the last write wins and both are logged.

pub mod key;
pub mod log;
pub mod store;

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use url::Url;

use crate::browser::{BrowsingContext, NavigationOptions};
use crate::config::CacheConfig;
use crate::strategy::RetrievalStrategy;
use crate::Error;

pub use key::CacheKey;
pub use log::{AccessLog, LogRecord, format_timestamp};
pub use store::EntryStore;

/// Page content cache bound to one directory.
pub struct PageCache {
    config: CacheConfig,
    store: EntryStore,
    log: AccessLog,
    strategy: Box<dyn RetrievalStrategy>,
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("config", &self.config)
            .field("mode", &self.strategy.mode())
            .finish()
    }
}

impl PageCache {
    /// Open a cache with `config`, creating its directory if absent.
    pub async fn open(config: CacheConfig) -> Result<Self, Error> {
        config.validate()?;

        let store = EntryStore::new(config.directory.clone());
        store.ensure_dir().await?;

        let log = AccessLog::in_dir(store.dir());
        let strategy = config.mode.strategy();

        tracing::debug!(
            dir = %config.directory.display(),
            ttl_ms = config.ttl_ms,
            mode = %config.mode,
            "opened page cache"
        );

        Ok(Self { config, store, log, strategy })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.log
    }

    /// Where the entry for `url` lives, whether or not it exists yet.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.store.path_for(&CacheKey::derive(url))
    }

    /// Content for `url`, served from disk when fresh, otherwise retrieved
    /// through `ctx`, persisted and logged.
    ///
    /// Retrieval failures are returned as-is and leave no entry or log line.
    pub async fn get(
        &self, ctx: &dyn BrowsingContext, url: &str, opts: Option<&NavigationOptions>,
    ) -> Result<String, Error> {
        let key = CacheKey::derive(url);
        let now = SystemTime::now();

        if let Some(content) = self.fresh(&key, now).await? {
            tracing::debug!("cache hit for {}", url);
            return Ok(content);
        }

        let target = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        let default_opts = NavigationOptions::default();
        let opts = opts.unwrap_or(&default_opts);

        tracing::debug!("cache miss for {}, retrieving via {}", url, self.strategy.mode());
        let content = self.strategy.fetch(ctx, &target, opts).await?;

        self.store.ensure_dir().await?;
        self.store.write(&key, &content).await?;
        self.log.append(&DateTime::<Local>::from(now), &key, url).await?;

        Ok(content)
    }

    /// Stored content for `url` if it is still fresh. Never retrieves.
    pub async fn peek(&self, url: &str) -> Result<Option<String>, Error> {
        self.fresh(&CacheKey::derive(url), SystemTime::now()).await
    }

    async fn fresh(&self, key: &CacheKey, now: SystemTime) -> Result<Option<String>, Error> {
        match self.store.probe(key, now).await? {
            Some(age) if age < self.config.ttl() => self.store.read(key).await,
            _ => Ok(None),
        }
    }
}
