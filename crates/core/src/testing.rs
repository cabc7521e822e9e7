//! In-memory browsing context for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use url::Url;

use crate::browser::{BrowserError, BrowsingContext, NavigationOptions};

/// Records every navigation and evaluation, serving bodies from a map.
pub(crate) struct FakeContext {
    current: Mutex<Url>,
    navigations: Mutex<Vec<Url>>,
    evaluations: Mutex<Vec<(String, Vec<Value>)>>,
    bodies: Mutex<HashMap<String, String>>,
    fail: Mutex<bool>,
}

impl FakeContext {
    pub(crate) fn new() -> Self {
        Self::at("about:blank")
    }

    pub(crate) fn at(url: &str) -> Self {
        Self {
            current: Mutex::new(Url::parse(url).unwrap()),
            navigations: Mutex::new(Vec::new()),
            evaluations: Mutex::new(Vec::new()),
            bodies: Mutex::new(HashMap::new()),
            fail: Mutex::new(false),
        }
    }

    pub(crate) fn set_body(&self, url: &str, body: &str) {
        self.bodies.lock().unwrap().insert(url.to_string(), body.to_string());
    }

    pub(crate) fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub(crate) fn navigations(&self) -> Vec<Url> {
        self.navigations.lock().unwrap().clone()
    }

    pub(crate) fn evaluations(&self) -> Vec<(String, Vec<Value>)> {
        self.evaluations.lock().unwrap().clone()
    }

    /// Navigations plus evaluations.
    pub(crate) fn activity(&self) -> usize {
        self.navigations().len() + self.evaluations().len()
    }

    fn body_for(&self, url: &str, fallback: String) -> String {
        self.bodies.lock().unwrap().get(url).cloned().unwrap_or(fallback)
    }
}

#[async_trait::async_trait]
impl BrowsingContext for FakeContext {
    async fn navigate(&self, url: &Url, _opts: &NavigationOptions) -> Result<(), BrowserError> {
        if *self.fail.lock().unwrap() {
            return Err(BrowserError::Navigation { url: url.to_string(), reason: "net::ERR_FAILED".into() });
        }
        self.navigations.lock().unwrap().push(url.clone());
        *self.current.lock().unwrap() = url.clone();
        Ok(())
    }

    async fn evaluate(&self, expression: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        self.evaluations.lock().unwrap().push((expression.to_string(), args.clone()));
        if *self.fail.lock().unwrap() {
            return Err(BrowserError::Evaluation("TypeError: Failed to fetch".into()));
        }

        if expression.contains("fetch(") {
            let url = args.first().and_then(Value::as_str).unwrap_or_default().to_string();
            let body = self.body_for(&url, format!("raw:{url}"));
            return Ok(Value::String(body));
        }

        if expression.contains("documentElement") {
            let url = self.current.lock().unwrap().to_string();
            let body = self.body_for(&url, format!("<html><head></head><body>{url}</body></html>"));
            return Ok(Value::String(body));
        }

        Ok(Value::Null)
    }

    async fn current_url(&self) -> Result<Url, BrowserError> {
        Ok(self.current.lock().unwrap().clone())
    }
}
