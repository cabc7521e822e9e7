//! Core types and the caching engine for pagecache.
//!
//! This crate provides:
//! - Disk-backed page content cache with TTL freshness
//! - Browsing context capability and retrieval strategies
//! - Append-only access log
//! - Unified error types and configuration

pub mod browser;
pub mod cache;
pub mod config;
pub mod error;
pub mod origin;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserError, BrowsingContext, NavigationOptions};
pub use cache::{AccessLog, CacheKey, LogRecord, PageCache};
pub use config::{CacheConfig, ConfigError};
pub use error::Error;
pub use origin::ensure_origin;
pub use strategy::{FullNavigation, InContextFetch, RetrievalMode, RetrievalStrategy};
