//! Link harvesting from cached markup.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// An anchor found in a cached page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    /// Anchor text, whitespace-collapsed; `[link]` when empty.
    pub text: String,
    /// Absolute href, resolved against the page URL.
    pub href: String,
}

/// All `<a href>` links in `html`, resolved against `base_url`, first occurrence wins.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Link> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector");
    let mut seen = HashSet::new();

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = base_url.join(anchor.value().attr("href")?).ok()?;
            let text = anchor.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
            Some(Link { text: if text.is_empty() { "[link]".to_string() } else { text }, href: href.into() })
        })
        .filter(|link| seen.insert(link.href.clone()))
        .collect()
}

/// Links from `html` that stay on the origin of `base_url`.
///
/// Unparsable or cross-origin hrefs are dropped.
pub fn same_origin_links(html: &str, base_url: &Url) -> Vec<Link> {
    let origin = base_url.origin();
    extract_links(html, base_url)
        .into_iter()
        .filter(|link| Url::parse(&link.href).is_ok_and(|u| u.origin() == origin))
        .collect()
}
