//! Resolve result anchors to original image URLs.

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::{PaginationLimits, SearchEngineProfile};
use crate::scrapers::browser::{ElementRef, Interaction, PageSession};

/// Find `key` in the query string of `link` and return its decoded value.
///
/// The first pair whose decoded key matches decides the result; later pairs
/// are not considered. The value must decode to an absolute http(s) URL.
pub fn extract_image_url(link: &str, key: &str) -> Option<String> {
    let (_, query) = link.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    let raw = query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let k = urlencoding::decode(k).ok()?;
        (k == key).then_some(v)
    })?;

    let decoded = urlencoding::decode(raw).ok()?.into_owned();
    match url::Url::parse(&decoded) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(decoded),
        _ => None,
    }
}

/// Turns page anchors into image URLs by simulating the interaction that
/// makes the page fill in each anchor's real link.
pub struct AnchorResolver<'a> {
    profile: &'a SearchEngineProfile,
    limits: &'a PaginationLimits,
}

impl<'a> AnchorResolver<'a> {
    pub fn new(profile: &'a SearchEngineProfile, limits: &'a PaginationLimits) -> Self {
        Self { profile, limits }
    }

    /// Resolve one anchor.
    ///
    /// The link is populated asynchronously after the right-click, so it is
    /// re-read until it carries the image key or the link timeout passes.
    pub async fn resolve(
        &self,
        session: &mut dyn PageSession,
        anchor: &ElementRef,
    ) -> Option<String> {
        if let Err(e) = session.interact(anchor, Interaction::ContextClick).await {
            debug!("Context click on anchor #{} failed: {}", anchor.index, e);
        }

        let deadline = Instant::now() + self.limits.link_timeout();
        loop {
            match session
                .read_attribute(anchor, &self.profile.link_attribute)
                .await
            {
                Ok(Some(link)) => {
                    if let Some(url) = extract_image_url(&link, &self.profile.image_url_key) {
                        return Some(url);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Anchor #{} unreadable: {}", anchor.index, e);
                    return None;
                }
            }

            if Instant::now() >= deadline {
                return None;
            }
            sleep(self.limits.poll_interval()).await;
        }
    }

    /// Resolve the first `count` anchors, skipping those without an image URL.
    ///
    /// Output order follows anchor order.
    pub async fn resolve_all(
        &self,
        session: &mut dyn PageSession,
        anchors: &[ElementRef],
        count: usize,
    ) -> Vec<String> {
        let mut urls = Vec::with_capacity(count.min(anchors.len()));

        for anchor in anchors.iter().take(count) {
            match self.resolve(session, anchor).await {
                Some(url) => urls.push(url),
                None => warn!("No image URL for result #{}", anchor.index),
            }
        }

        urls
    }
}
