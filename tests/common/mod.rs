//! In-memory page, launcher and fetcher shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use imgacquire::config::{Config, PaginationLimits, SearchEngineProfile, Selectors};
use imgacquire::error::{FetchError, SessionError};
use imgacquire::scrapers::{ElementRef, HeadResponse, Interaction, PageSession, SessionLauncher};

/// How the fake page reacts to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Actions take effect before the next read.
    Normal,
    /// Actions take effect only after this many further reads.
    Slow(usize),
    /// Actions never change the page.
    Never,
}

/// Observable state of a [`FakePage`].
#[derive(Debug)]
pub struct PageState {
    selectors: Selectors,
    /// Image URL carried by each anchor once its link is populated; `None`
    /// for anchors whose link never carries one.
    pub pool: Vec<Option<String>>,
    /// Anchors currently rendered.
    pub present: usize,
    /// Anchors added per successful action.
    pub batch: usize,
    pub status: Option<String>,
    pub load_more_visible: bool,
    /// Set status to exhausted and hide the control once the pool is rendered.
    pub exhaust_when_done: bool,
    pub behavior: Behavior,
    pending_growth: Option<usize>,
    revealed: HashMap<usize, usize>,
    pub scrolls: usize,
    pub clicks: usize,
    pub context_clicks: usize,
    pub closed: bool,
}

impl PageState {
    pub fn new(pool: Vec<Option<String>>, present: usize) -> Self {
        Self {
            selectors: SearchEngineProfile::default().selectors,
            present: present.min(pool.len()),
            pool,
            batch: 4,
            status: Some("5".to_string()),
            load_more_visible: false,
            exhaust_when_done: true,
            behavior: Behavior::Normal,
            pending_growth: None,
            revealed: HashMap::new(),
            scrolls: 0,
            clicks: 0,
            context_clicks: 0,
            closed: false,
        }
    }

    /// `total` resolvable anchors with `present` rendered up front.
    pub fn with_images(total: usize, present: usize) -> Self {
        Self::new(image_urls(total).into_iter().map(Some).collect(), present)
    }

    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn status(mut self, status: Option<&str>) -> Self {
        self.status = status.map(|s| s.to_string());
        self
    }

    pub fn load_more(mut self, visible: bool) -> Self {
        self.load_more_visible = visible;
        self
    }

    pub fn batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }

    pub fn exhaust_when_done(mut self, exhaust: bool) -> Self {
        self.exhaust_when_done = exhaust;
        self
    }

    pub fn actions(&self) -> usize {
        self.scrolls + self.clicks
    }

    pub fn shared(self) -> Arc<Mutex<PageState>> {
        Arc::new(Mutex::new(self))
    }

    fn grow(&mut self) {
        self.present = (self.present + self.batch).min(self.pool.len());
        if self.exhaust_when_done && self.present == self.pool.len() {
            self.status = Some("3".to_string());
            self.load_more_visible = false;
        }
    }

    fn schedule_growth(&mut self) {
        match self.behavior {
            Behavior::Normal => self.grow(),
            Behavior::Slow(reads) => {
                if self.pending_growth.is_none() {
                    self.pending_growth = Some(reads);
                }
            }
            Behavior::Never => {}
        }
    }

    fn tick_growth(&mut self) {
        match self.pending_growth {
            Some(0) => {
                self.pending_growth = None;
                self.grow();
            }
            Some(n) => self.pending_growth = Some(n - 1),
            None => {}
        }
    }

    fn link(&mut self, index: usize) -> Option<String> {
        let remaining = self.revealed.get_mut(&index)?;
        if *remaining > 0 {
            *remaining -= 1;
            return Some("#".to_string());
        }

        let url = self.pool.get(index).cloned().flatten();
        Some(match url {
            Some(url) => format!(
                "/imgres?imgurl={}&imgrefurl=https%3A%2F%2Fsource.test%2Fpage&h=600&w=800",
                urlencoding::encode(&url)
            ),
            None => "/imgres?imgrefurl=https%3A%2F%2Fsource.test%2Fpage&h=600".to_string(),
        })
    }
}

/// Distinct image URLs `https://img.test/N/photo.jpg`.
pub fn image_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://img.test/{}/photo.jpg", i))
        .collect()
}

/// A results page held in memory.
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new(state: Arc<Mutex<PageState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn locate(&mut self, selector: &str) -> Result<Vec<ElementRef>, SessionError> {
        let mut state = self.state.lock().unwrap();
        if selector == state.selectors.anchor {
            state.tick_growth();
            Ok(ElementRef::all(selector, state.present))
        } else if selector == state.selectors.status
            || selector == state.selectors.load_more
            || selector == state.selectors.body
        {
            Ok(vec![ElementRef::first(selector)])
        } else {
            Ok(Vec::new())
        }
    }

    async fn is_visible(&mut self, element: &ElementRef) -> Result<bool, SessionError> {
        let state = self.state.lock().unwrap();
        if element.selector == state.selectors.load_more {
            Ok(state.load_more_visible)
        } else {
            Ok(true)
        }
    }

    async fn read_attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let mut state = self.state.lock().unwrap();
        if element.selector == state.selectors.status && name == "data-status" {
            return Ok(state.status.clone());
        }
        if element.selector == state.selectors.anchor && name == "href" {
            if element.index >= state.present {
                return Err(SessionError::Command(format!(
                    "no element {} for {}",
                    element.index, element.selector
                )));
            }
            return Ok(state.link(element.index));
        }
        Ok(None)
    }

    async fn interact(
        &mut self,
        element: &ElementRef,
        interaction: Interaction,
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        match interaction {
            Interaction::ContextClick if element.selector == state.selectors.anchor => {
                state.context_clicks += 1;
                let delay = match state.behavior {
                    Behavior::Normal => Some(0),
                    Behavior::Slow(reads) => Some(reads),
                    Behavior::Never => None,
                };
                if let Some(delay) = delay {
                    state.revealed.entry(element.index).or_insert(delay);
                }
            }
            Interaction::HoverClick if element.selector == state.selectors.load_more => {
                state.clicks += 1;
                if !state.load_more_visible {
                    return Err(SessionError::Command("element not interactable".into()));
                }
                state.schedule_growth();
            }
            Interaction::PressEnd if element.selector == state.selectors.body => {
                state.scrolls += 1;
                state.schedule_growth();
            }
            _ => {}
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.state.lock().unwrap().closed = true;
    }
}

/// Hands out [`FakePage`]s over one shared state.
pub struct FakeLauncher {
    pub state: Arc<Mutex<PageState>>,
    pub launches: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeLauncher {
    pub fn new(state: PageState) -> Self {
        Self {
            state: state.shared(),
            launches: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A launcher whose browser never starts.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(PageState::with_images(0, 0))
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, url: &str) -> Result<Box<dyn PageSession>, SessionError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(SessionError::Launch("no browser in test".into()));
        }
        Ok(Box::new(FakePage::new(self.state.clone())))
    }
}

/// How the fake fetcher answers for one URL.
#[derive(Debug, Clone)]
pub struct FakeResource {
    pub content_type: Option<String>,
    /// Status the HEAD request fails with, if any.
    pub head_failure: Option<u16>,
    pub body: Result<Vec<u8>, u16>,
}

impl FakeResource {
    pub fn image(content_type: &str, body: &[u8]) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            head_failure: None,
            body: Ok(body.to_vec()),
        }
    }

    pub fn untyped(body: &[u8]) -> Self {
        Self {
            content_type: None,
            head_failure: None,
            body: Ok(body.to_vec()),
        }
    }

    pub fn status(content_type: &str, status: u16) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            head_failure: None,
            body: Err(status),
        }
    }

    /// HEAD fails with `status`; GET would still succeed.
    pub fn head_fails(status: u16) -> Self {
        Self {
            content_type: Some("image/png".to_string()),
            head_failure: Some(status),
            body: Ok(b"unreachable".to_vec()),
        }
    }
}

/// Serves canned resources; unknown URLs are `image/jpeg`.
#[derive(Default)]
pub struct FakeFetcher {
    resources: HashMap<String, FakeResource>,
    pub heads: AtomicUsize,
    pub gets: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, resource: FakeResource) -> Self {
        self.resources.insert(url.to_string(), resource);
        self
    }

    pub fn requests(&self) -> usize {
        self.heads.load(Ordering::SeqCst) + self.gets.load(Ordering::SeqCst)
    }

    fn resource(&self, url: &str) -> FakeResource {
        self.resources
            .get(url)
            .cloned()
            .unwrap_or_else(|| FakeResource::image("image/jpeg", url.as_bytes()))
    }
}

#[async_trait]
impl imgacquire::scrapers::ResourceFetcher for FakeFetcher {
    async fn head(&self, url: &str) -> Result<HeadResponse, FetchError> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        let resource = self.resource(url);
        if let Some(status) = resource.head_failure {
            return Err(FetchError::Status(status));
        }
        let mut headers = HashMap::new();
        if let Some(ct) = resource.content_type {
            headers.insert("Content-Type".to_string(), ct);
        }
        Ok(HeadResponse::new(StatusCode::OK, headers))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.resource(url).body.map_err(FetchError::Status)
    }
}

/// Limits small enough to keep fake-page tests fast.
pub fn fast_limits() -> PaginationLimits {
    PaginationLimits {
        max_actions: 20,
        max_idle_actions: 3,
        settle_timeout_ms: 200,
        poll_interval_ms: 2,
        link_timeout_ms: 200,
    }
}

pub fn test_config() -> Config {
    Config {
        pagination: fast_limits(),
        ..Config::default()
    }
}
