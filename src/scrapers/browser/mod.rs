//! Browser session capabilities.
//!
//! The pager and resolver only need to locate elements, test visibility,
//! read attributes and simulate user input. Those operations form the
//! [`PageSession`] trait so the extraction logic runs the same against a
//! real Chrome page or an in-memory fake.

mod chromium;
mod config;

pub use chromium::ChromiumLauncher;
pub use config::BrowserEngineConfig;

use async_trait::async_trait;

use crate::error::SessionError;

/// Handle to one element of the page: its position among the current
/// matches of a selector.
///
/// Handles carry no identity beyond that position. They are re-resolved on
/// every use, so a collection that grew between polls stays addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub selector: String,
    pub index: usize,
}

impl ElementRef {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }

    /// The first match of `selector`.
    pub fn first(selector: impl Into<String>) -> Self {
        Self::new(selector, 0)
    }

    /// Handles for the first `count` matches of `selector`.
    pub fn all(selector: &str, count: usize) -> Vec<Self> {
        (0..count).map(|i| Self::new(selector, i)).collect()
    }
}

/// Simulated user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Move over the element, then click it.
    HoverClick,
    /// Move over the element, then right-click it.
    ContextClick,
    /// Send the End key to the element, scrolling to the bottom.
    PressEnd,
}

/// An open page in an automated browser.
///
/// Actions may mutate the DOM asynchronously; callers re-read page state
/// after acting rather than assuming the effect is visible immediately.
#[async_trait]
pub trait PageSession: Send {
    /// All current matches of `selector`, in document order.
    async fn locate(&mut self, selector: &str) -> Result<Vec<ElementRef>, SessionError>;

    async fn is_visible(&mut self, element: &ElementRef) -> Result<bool, SessionError>;

    async fn read_attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, SessionError>;

    async fn interact(
        &mut self,
        element: &ElementRef,
        interaction: Interaction,
    ) -> Result<(), SessionError>;

    /// Release the session. Safe to call once on every exit path.
    async fn close(&mut self);
}

/// Opens a page session at a URL.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Open `url` in a fresh session.
    ///
    /// Failing here is fatal for a run. Implementations release anything they
    /// acquired before returning an error.
    async fn launch(&self, url: &str) -> Result<Box<dyn PageSession>, SessionError>;
}
