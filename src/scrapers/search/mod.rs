//! Image search extraction: build the results URL, page through results,
//! and resolve anchors to image URLs.

mod anchor;
mod pager;
mod query;

pub use anchor::{extract_image_url, AnchorResolver};
pub use pager::{
    next_state, PageObservation, PagerState, PaginationOutcome, ResultPager, StallReason,
};
pub use query::QueryUrlBuilder;

use tracing::info;

use crate::config::{PaginationLimits, SearchEngineProfile};
use crate::error::SessionError;
use crate::scrapers::browser::{PageSession, SessionLauncher};

/// Runs pagination and anchor resolution inside one browser session.
pub struct ImageExtractor<'a> {
    profile: &'a SearchEngineProfile,
    limits: &'a PaginationLimits,
    launcher: &'a dyn SessionLauncher,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(
        profile: &'a SearchEngineProfile,
        limits: &'a PaginationLimits,
        launcher: &'a dyn SessionLauncher,
    ) -> Self {
        Self {
            profile,
            limits,
            launcher,
        }
    }

    /// Open `search_url` and extract up to `count` image URLs.
    ///
    /// Only a failure to open the session is an error. The session is closed
    /// before returning either way.
    pub async fn extract(
        &self,
        search_url: &str,
        count: usize,
    ) -> Result<Vec<String>, SessionError> {
        let mut session = self.launcher.launch(search_url).await?;
        let urls = self.extract_from(session.as_mut(), count).await;
        session.close().await;
        Ok(urls)
    }

    /// Extract from an already open session.
    pub async fn extract_from(&self, session: &mut dyn PageSession, count: usize) -> Vec<String> {
        let outcome = ResultPager::new(self.profile, self.limits)
            .collect(session, count)
            .await;

        let urls = AnchorResolver::new(self.profile, self.limits)
            .resolve_all(session, &outcome.anchors, count)
            .await;

        info!(
            "Resolved {} image URLs from {} anchors ({:?})",
            urls.len(),
            outcome.anchors.len(),
            outcome.state
        );
        urls
    }
}
