//! Same-origin precondition for in-context retrieval and script evaluation.

use url::{Origin, Url};

use crate::browser::{BrowsingContext, NavigationOptions};
use crate::Error;

/// The bare origin of `url` (scheme, host and port) as a navigable URL.
///
/// Fails for URLs with an opaque origin (`data:`, `file:`, ...), which have
/// nothing to navigate to.
pub fn origin_url(url: &Url) -> Result<Url, Error> {
    match url.origin() {
        origin @ Origin::Tuple(..) => {
            Url::parse(&origin.ascii_serialization()).map_err(|e| Error::InvalidUrl(e.to_string()))
        }
        Origin::Opaque(_) => Err(Error::InvalidUrl(format!("{url} has no navigable origin"))),
    }
}

/// Make sure the context's current location shares an origin with `url`.
///
/// Navigates to the bare origin of `url` (not `url` itself) only when the
/// origins differ. Returns whether a navigation happened.
pub async fn ensure_origin(ctx: &dyn BrowsingContext, url: &Url, opts: &NavigationOptions) -> Result<bool, Error> {
    let target = origin_url(url)?;
    let current = ctx.current_url().await?;

    if current.origin() == target.origin() {
        return Ok(false);
    }

    tracing::debug!("navigating from {} to origin {}", current, target);
    ctx.navigate(&target, opts).await?;
    Ok(true)
}
