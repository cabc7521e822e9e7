//! How content is obtained on a cache miss.
//!
//! Two strategies are provided:
//!
//! - [`FullNavigation`]: load the URL as a new document and serialize its root element.
//! - [`InContextFetch`]: move to the URL's origin if needed, then `fetch()` the URL
//!   from inside the current document and return the response body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::browser::{BrowserError, BrowsingContext, NavigationOptions};
use crate::origin::ensure_origin;
use crate::Error;

const OUTER_HTML_JS: &str = "() => document.documentElement.outerHTML";

const FETCH_TEXT_JS: &str = r#"async (url) => {
    const res = await fetch(url);
    if (!res.ok) {
        throw new Error(`HTTP ${res.status} ${res.statusText} for ${url}`);
    }
    return await res.text();
}"#;

/// Retrieval strategy selected by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Same-origin `fetch()` from inside the current document.
    #[serde(alias = "FETCH")]
    Fetch,
    /// Full page load.
    #[default]
    #[serde(alias = "NAVIGATE")]
    Navigate,
}

impl RetrievalMode {
    /// Instantiate the strategy for this mode.
    pub fn strategy(self) -> Box<dyn RetrievalStrategy> {
        match self {
            RetrievalMode::Fetch => Box::new(InContextFetch),
            RetrievalMode::Navigate => Box::new(FullNavigation),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RetrievalMode::Fetch => "fetch",
            RetrievalMode::Navigate => "navigate",
        }
    }
}

impl std::fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fetch" => Ok(RetrievalMode::Fetch),
            "navigate" => Ok(RetrievalMode::Navigate),
            other => Err(format!("unknown retrieval mode: {other} (expected fetch or navigate)")),
        }
    }
}

/// Obtains fresh content for a URL through a browsing context.
#[async_trait::async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Which mode this strategy implements.
    fn mode(&self) -> RetrievalMode;

    /// Retrieve the content of `url`. Failures propagate untouched.
    async fn fetch(&self, ctx: &dyn BrowsingContext, url: &Url, opts: &NavigationOptions) -> Result<String, Error>;
}

/// Loads the URL as a new document. Leaves the context on `url`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullNavigation;

#[async_trait::async_trait]
impl RetrievalStrategy for FullNavigation {
    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Navigate
    }

    async fn fetch(&self, ctx: &dyn BrowsingContext, url: &Url, opts: &NavigationOptions) -> Result<String, Error> {
        ctx.navigate(url, opts).await?;
        let value = ctx.evaluate(OUTER_HTML_JS, Vec::new()).await?;
        expect_text(value)
    }
}

/// Issues a same-origin `fetch()` from the current document.
///
/// Navigates only when the context is not already on the URL's origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct InContextFetch;

#[async_trait::async_trait]
impl RetrievalStrategy for InContextFetch {
    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Fetch
    }

    async fn fetch(&self, ctx: &dyn BrowsingContext, url: &Url, opts: &NavigationOptions) -> Result<String, Error> {
        ensure_origin(ctx, url, opts).await?;
        let value = ctx.evaluate(FETCH_TEXT_JS, vec![Value::String(url.to_string())]).await?;
        expect_text(value)
    }
}

fn expect_text(value: Value) -> Result<String, Error> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(BrowserError::UnexpectedResult(format!("expected string, got {other}")).into()),
    }
}
