//! Pagination state machine for the results page.
//!
//! The page only renders a window of results. More appear either after the
//! "show more" control is clicked or after scrolling to the end, and the
//! status indicator tells which of the two (if any) can still help. The pager
//! alternates between reading the page and acting on it until it has enough
//! anchors or nothing further can be loaded.

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::{PaginationLimits, SearchEngineProfile};
use crate::error::SessionError;
use crate::models::PageStatus;
use crate::scrapers::browser::{ElementRef, Interaction, PageSession};

/// Pager states. `Sufficient` and `Stalled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// Reading the page to decide the next step.
    Polling,
    /// Clicking the load-more control.
    LoadingMore,
    /// Scrolling to the end to trigger lazy loading.
    Scrolling,
    /// Enough anchors are present.
    Sufficient,
    /// No way to load more; proceed with what is present.
    Stalled,
}

impl PagerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sufficient | Self::Stalled)
    }
}

/// Why pagination stopped short of the requested count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallReason {
    /// No visible control and the status does not allow scrolling.
    NothingToLoad,
    /// Too many actions in a row produced no new anchors.
    NoProgress,
    /// The total action budget was spent.
    ActionBudget,
    /// The anchor collection could not be read.
    PageUnreadable,
}

/// One reading of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageObservation {
    pub anchors: usize,
    pub status: PageStatus,
    pub load_more_visible: bool,
}

/// Transition out of `Polling`.
///
/// Enough anchors wins over everything. Otherwise a visible control is
/// clicked, a loading/has-more status is scrolled, and anything else stalls.
pub fn next_state(observation: &PageObservation, target: usize) -> PagerState {
    if observation.anchors >= target {
        PagerState::Sufficient
    } else if observation.load_more_visible {
        PagerState::LoadingMore
    } else if observation.status.allows_scroll() {
        PagerState::Scrolling
    } else {
        PagerState::Stalled
    }
}

/// Result of a pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOutcome {
    /// Terminal state reached.
    pub state: PagerState,
    /// Set when `state` is `Stalled`.
    pub stall_reason: Option<StallReason>,
    /// At most the requested number of anchors, in page order.
    pub anchors: Vec<ElementRef>,
    /// Load-more clicks and scrolls performed.
    pub actions: usize,
}

/// Drives a page session until enough result anchors are present.
pub struct ResultPager<'a> {
    profile: &'a SearchEngineProfile,
    limits: &'a PaginationLimits,
}

impl<'a> ResultPager<'a> {
    pub fn new(profile: &'a SearchEngineProfile, limits: &'a PaginationLimits) -> Self {
        Self { profile, limits }
    }

    /// Read anchors, status and control visibility.
    ///
    /// Only a failure to list anchors is an error. A missing status element
    /// reads as `Unknown` and a missing control as not visible.
    pub async fn observe(
        &self,
        session: &mut dyn PageSession,
    ) -> Result<(PageObservation, Vec<ElementRef>), SessionError> {
        let selectors = &self.profile.selectors;
        let anchors = session.locate(&selectors.anchor).await?;

        let status = self.read_status(session).await;
        let load_more_visible = self.load_more_visible(session).await;

        Ok((
            PageObservation {
                anchors: anchors.len(),
                status,
                load_more_visible,
            },
            anchors,
        ))
    }

    async fn read_status(&self, session: &mut dyn PageSession) -> PageStatus {
        let status_el = ElementRef::first(self.profile.selectors.status.as_str());
        match session
            .read_attribute(&status_el, &self.profile.status_attribute)
            .await
        {
            Ok(raw) => PageStatus::parse(raw.as_deref(), &self.profile.status_codes),
            Err(e) => {
                debug!("Status indicator unavailable: {}", e);
                PageStatus::Unknown
            }
        }
    }

    async fn load_more_visible(&self, session: &mut dyn PageSession) -> bool {
        let control = ElementRef::first(self.profile.selectors.load_more.as_str());
        session.is_visible(&control).await.unwrap_or(false)
    }

    /// Run the state machine until it reaches `Sufficient` or `Stalled`.
    pub async fn collect(&self, session: &mut dyn PageSession, count: usize) -> PaginationOutcome {
        let mut anchors = Vec::new();
        let mut observation = match self.observe(session).await {
            Ok((obs, found)) => {
                anchors = found;
                obs
            }
            Err(e) => {
                warn!("Could not read result anchors: {}", e);
                return finish(
                    PagerState::Stalled,
                    Some(StallReason::PageUnreadable),
                    anchors,
                    0,
                    count,
                );
            }
        };

        let mut state = PagerState::Polling;
        let mut stall_reason = None;
        let mut actions = 0usize;
        let mut idle_actions = 0usize;

        while !state.is_terminal() {
            state = match state {
                PagerState::Polling => {
                    let next = next_state(&observation, count);
                    debug!(
                        "Poll: {} anchors, status {:?}, load-more visible: {} -> {:?}",
                        observation.anchors, observation.status, observation.load_more_visible, next
                    );
                    if next == PagerState::Stalled {
                        stall_reason = Some(StallReason::NothingToLoad);
                    }
                    next
                }
                PagerState::LoadingMore | PagerState::Scrolling => {
                    if actions >= self.limits.max_actions {
                        stall_reason = Some(StallReason::ActionBudget);
                        PagerState::Stalled
                    } else {
                        self.act(session, state).await;
                        actions += 1;

                        let before = observation.anchors;
                        match self.settle(session, before).await {
                            Ok((obs, found)) => {
                                observation = obs;
                                anchors = found;
                            }
                            Err(e) => {
                                warn!("Lost track of result anchors: {}", e);
                                stall_reason = Some(StallReason::PageUnreadable);
                                break;
                            }
                        }

                        if observation.anchors > before {
                            idle_actions = 0;
                            PagerState::Polling
                        } else {
                            idle_actions += 1;
                            if idle_actions >= self.limits.max_idle_actions {
                                stall_reason = Some(StallReason::NoProgress);
                                PagerState::Stalled
                            } else {
                                PagerState::Polling
                            }
                        }
                    }
                }
                terminal => terminal,
            };
        }

        if stall_reason.is_some() && state != PagerState::Sufficient {
            state = PagerState::Stalled;
        }

        finish(state, stall_reason, anchors, actions, count)
    }

    async fn act(&self, session: &mut dyn PageSession, state: PagerState) {
        let selectors = &self.profile.selectors;
        let (target, interaction) = match state {
            PagerState::LoadingMore => (
                ElementRef::first(selectors.load_more.as_str()),
                Interaction::HoverClick,
            ),
            _ => (
                ElementRef::first(selectors.body.as_str()),
                Interaction::PressEnd,
            ),
        };

        // A failed action counts as an action without progress
        if let Err(e) = session.interact(&target, interaction).await {
            debug!("{:?} failed: {}", interaction, e);
        }
    }

    /// Re-read the page until the anchor count grows past `before` or the
    /// settle timeout passes.
    async fn settle(
        &self,
        session: &mut dyn PageSession,
        before: usize,
    ) -> Result<(PageObservation, Vec<ElementRef>), SessionError> {
        let deadline = Instant::now() + self.limits.settle_timeout();

        loop {
            sleep(self.limits.poll_interval()).await;
            let (observation, anchors) = self.observe(session).await?;
            if observation.anchors > before || Instant::now() >= deadline {
                return Ok((observation, anchors));
            }
        }
    }
}

fn finish(
    state: PagerState,
    stall_reason: Option<StallReason>,
    mut anchors: Vec<ElementRef>,
    actions: usize,
    count: usize,
) -> PaginationOutcome {
    match state {
        PagerState::Sufficient => info!(
            "Collected {} anchors after {} actions",
            anchors.len(),
            actions
        ),
        _ => warn!(
            "Pagination stalled ({:?}) with {} of {} anchors after {} actions",
            stall_reason,
            anchors.len(),
            count,
            actions
        ),
    }

    anchors.truncate(count);
    PaginationOutcome {
        state,
        stall_reason: if state == PagerState::Stalled {
            stall_reason
        } else {
            None
        },
        anchors,
        actions,
    }
}
