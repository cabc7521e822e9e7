//! Browsing context capability required by the cache.
//!
//! The cache never launches or manages a browser. It drives whatever
//! implements [`BrowsingContext`]: navigation, script evaluation and
//! reading the current location.

use thiserror::Error;
use url::Url;

/// Errors surfaced by a browsing context.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Failed to navigate to URL.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Script evaluation threw or could not be dispatched.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Evaluation returned a value of the wrong shape.
    #[error("unexpected evaluation result: {0}")]
    UnexpectedResult(String),

    /// Timeout waiting for navigation to complete.
    #[error("navigation timeout after {0}ms")]
    Timeout(u64),

    /// Wait selector not found.
    #[error("wait_for selector not found: {0}")]
    SelectorNotFound(String),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,
}

/// Options forwarded unchanged to [`BrowsingContext::navigate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationOptions {
    /// Upper bound on the navigation, including `wait_for`.
    pub timeout_ms: Option<u64>,

    /// CSS selector that must be present before navigation counts as complete.
    pub wait_for: Option<String>,
}

impl NavigationOptions {
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }
}

/// A controllable document/session.
///
/// Only one call should be in flight per context at a time.
#[async_trait::async_trait]
pub trait BrowsingContext: Send + Sync {
    /// Load `url` as a new document and wait for it to complete.
    async fn navigate(&self, url: &Url, opts: &NavigationOptions) -> Result<(), BrowserError>;

    /// Apply the JavaScript function `expression` to `args` inside the
    /// current document, awaiting a returned promise.
    async fn evaluate(
        &self, expression: &str, args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BrowserError>;

    /// Current location of the context (`about:blank` before any navigation).
    async fn current_url(&self) -> Result<Url, BrowserError>;
}
