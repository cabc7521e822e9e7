//! pagecache command-line entry point.
//!
//! Drives a Chromium tab through the page cache. Logging goes to stderr so
//! page content and links can be piped from stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagecache_client::{ChromiumBrowser, ChromiumContext, LaunchOptions, same_origin_links};
use pagecache_core::{BrowsingContext, CacheConfig, NavigationOptions, PageCache, RetrievalMode, ensure_origin};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Collects `a.href` for every anchor after parsing the markup in the current
/// document, so relative links resolve against the context's origin.
const IN_PAGE_LINKS_JS: &str = r#"(html) => {
    const doc = new DOMParser().parseFromString(html, "text/html");
    return Array.from(doc.querySelectorAll("a"), a => a.href).filter(link => {
        try {
            return new URL(link).origin == location.origin;
        } catch (error) {
            return false;
        }
    });
}"#;

#[derive(Debug, Parser)]
#[command(name = "pagecache", version, about = "Disk-backed cache for browser-retrieved pages")]
struct Cli {
    /// Cache directory (overrides PAGE_CACHE_DIRECTORY).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Freshness window in milliseconds (overrides PAGE_CACHE_TTL_MS).
    #[arg(long, global = true)]
    ttl_ms: Option<u64>,

    /// Retrieval mode on a miss: fetch or navigate (overrides PAGE_CACHE_MODE).
    #[arg(long, global = true)]
    mode: Option<RetrievalMode>,

    /// Show the browser window.
    #[arg(long, global = true)]
    headed: bool,

    /// Navigation timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// CSS selector to wait for after each navigation.
    #[arg(long, global = true)]
    wait_for: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the content of a URL, retrieving it only when the cache is stale.
    Get { url: String },

    /// Print the same-origin links of a URL.
    Links {
        url: String,

        /// Resolve links inside the browser instead of parsing locally.
        #[arg(long)]
        in_page: bool,
    },

    /// Print the access log.
    Log,
}

impl Cli {
    fn cache_config(&self) -> Result<CacheConfig> {
        let mut config = CacheConfig::load().context("loading cache configuration")?;
        if let Some(dir) = &self.dir {
            config.directory = dir.clone();
        }
        if let Some(ttl_ms) = self.ttl_ms {
            config.ttl_ms = ttl_ms;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        Ok(config)
    }

    fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions { timeout_ms: self.timeout_ms, wait_for: self.wait_for.clone() }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let cache = PageCache::open(cli.cache_config()?).await?;

    if let Command::Log = cli.command {
        for record in cache.access_log().records().await? {
            println!("{record}");
        }
        return Ok(());
    }

    let browser = ChromiumBrowser::launch(&LaunchOptions { headless: !cli.headed, ..Default::default() }).await?;
    let ctx = browser.new_context().await?;

    let outcome = run(&cli, &cache, &ctx).await;

    ctx.close().await;
    browser.close().await?;
    outcome
}

async fn run(cli: &Cli, cache: &PageCache, ctx: &ChromiumContext) -> Result<()> {
    let opts = cli.navigation_options();

    match &cli.command {
        Command::Get { url } => {
            let content = cache.get(ctx, url, Some(&opts)).await?;
            println!("{content}");
        }
        Command::Links { url, in_page } => {
            let html = cache.get(ctx, url, Some(&opts)).await?;
            let base = Url::parse(url).with_context(|| format!("parsing {url}"))?;

            let links: Vec<String> = if *in_page {
                ensure_origin(ctx, &base, &opts).await?;
                let value = ctx.evaluate(IN_PAGE_LINKS_JS, vec![serde_json::Value::String(html)]).await?;
                serde_json::from_value(value).context("decoding in-page links")?
            } else {
                same_origin_links(&html, &base).into_iter().map(|l| l.href).collect()
            };

            tracing::info!(count = links.len(), "harvested links");
            println!("{} links", links.len());
            for link in links {
                println!("{link}");
            }
        }
        Command::Log => {}
    }

    Ok(())
}
