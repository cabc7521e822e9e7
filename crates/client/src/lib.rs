//! Browser-facing code for pagecache.
//!
//! This crate provides a Chrome/Chromium browsing context for the cache
//! engine and link harvesting over cached markup.

#[cfg(feature = "render")]
pub mod chromium;
pub mod links;

#[cfg(feature = "render")]
pub use chromium::{ChromiumBrowser, ChromiumContext, LaunchOptions};
pub use links::{Link, extract_links, same_origin_links};
