//! Headless Chrome/Chromium browsing context.
//!
//! Implements [`BrowsingContext`] on top of a chromiumoxide page, driving
//! the browser over the Chrome DevTools Protocol.

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use futures_util::StreamExt;
use pagecache_core::{BrowserError, BrowsingContext, NavigationOptions};
use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;

/// Poll interval while waiting for a `wait_for` selector.
const SELECTOR_POLL: Duration = Duration::from_millis(500);

/// Attempts before giving up on a `wait_for` selector.
const SELECTOR_ATTEMPTS: usize = 30;

/// Options for launching a browser.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window (default: true).
    pub headless: bool,

    /// Viewport dimensions (default: 1280x720).
    pub viewport: (u32, u32),
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self { headless: true, viewport: (1280, 720) }
    }
}

/// A launched browser process and its CDP event loop.
pub struct ChromiumBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch a browser instance.
    ///
    /// A background task drains Chrome DevTools Protocol events for the
    /// lifetime of the browser.
    pub async fn launch(opts: &LaunchOptions) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder().window_size(opts.viewport.0, opts.viewport.1);
        if !opts.headless {
            builder = builder.with_head();
        }

        let (browser, mut handler) = Browser::launch(builder.build().map_err(BrowserError::Launch)?)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Open a fresh context on `about:blank`.
    pub async fn new_context(&self) -> Result<ChromiumContext, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        Ok(ChromiumContext { page })
    }

    /// Close the browser and wait for its event loop to finish.
    pub async fn close(mut self) -> Result<(), BrowserError> {
        self.browser.close().await.map_err(|_| BrowserError::BrowserClosed)?;
        self.handler.await.ok();
        Ok(())
    }
}

/// One browser tab.
pub struct ChromiumContext {
    page: Page,
}

impl ChromiumContext {
    pub async fn close(self) {
        self.page.close().await.ok();
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError> {
        for _ in 0..SELECTOR_ATTEMPTS {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
        Err(BrowserError::SelectorNotFound(selector.to_string()))
    }
}

/// Build `(expression)(arg0, arg1, ...)` with JSON-encoded arguments.
fn call_expression(expression: &str, args: &[Value]) -> String {
    let args = args.iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
    format!("({expression})({args})")
}

#[async_trait::async_trait]
impl BrowsingContext for ChromiumContext {
    async fn navigate(&self, url: &Url, opts: &NavigationOptions) -> Result<(), BrowserError> {
        let navigation = async {
            self.page
                .goto(url.as_str())
                .await
                .map_err(|e| BrowserError::Navigation { url: url.to_string(), reason: e.to_string() })?;

            if let Some(selector) = &opts.wait_for {
                self.wait_for_selector(selector).await?;
            }
            Ok::<(), BrowserError>(())
        };

        match opts.timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), navigation)
                .await
                .map_err(|_| BrowserError::Timeout(ms))?,
            None => navigation.await,
        }
    }

    async fn evaluate(&self, expression: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        let params = EvaluateParams::builder()
            .expression(call_expression(expression, &args))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Evaluation)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn current_url(&self) -> Result<Url, BrowserError> {
        let current = self
            .page
            .url()
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        let current = current.unwrap_or_else(|| "about:blank".to_string());
        Url::parse(&current).map_err(|e| BrowserError::UnexpectedResult(format!("{current}: {e}")))
    }
}
