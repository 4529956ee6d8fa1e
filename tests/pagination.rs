//! Pagination and Anchor Resolution Tests
//!
//! Drives the pager, the anchor resolver and the extractor against in-memory
//! pages that update immediately, slowly, or never.

mod common;

use common::{fast_limits, image_urls, Behavior, FakeLauncher, FakePage, PageState};
use imgacquire::config::SearchEngineProfile;
use imgacquire::error::SessionError;
use imgacquire::scrapers::{AnchorResolver, ImageExtractor, PagerState, ResultPager, StallReason};

#[tokio::test]
async fn test_enough_anchors_on_first_poll() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let state = PageState::with_images(5, 5).shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 3)
        .await;

    assert_eq!(outcome.state, PagerState::Sufficient);
    assert_eq!(outcome.anchors.len(), 3);
    assert_eq!(outcome.actions, 0);
    assert_eq!(state.lock().unwrap().actions(), 0);
}

#[tokio::test]
async fn test_scrolls_until_sufficient() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let state = PageState::with_images(20, 2).batch(3).shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 10)
        .await;

    assert_eq!(outcome.state, PagerState::Sufficient);
    assert_eq!(outcome.anchors.len(), 10);
    // 2 -> 5 -> 8 -> 11
    assert_eq!(outcome.actions, 3);
    let state = state.lock().unwrap();
    assert_eq!(state.scrolls, 3);
    assert_eq!(state.clicks, 0);
}

#[tokio::test]
async fn test_visible_control_is_preferred_over_scrolling() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let state = PageState::with_images(12, 4)
        .status(Some("3"))
        .load_more(true)
        .batch(4)
        .shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 12)
        .await;

    assert_eq!(outcome.state, PagerState::Sufficient);
    let state = state.lock().unwrap();
    assert_eq!(state.clicks, 2);
    assert_eq!(state.scrolls, 0);
}

#[tokio::test]
async fn test_slow_page_is_waited_for() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let state = PageState::with_images(10, 2)
        .batch(4)
        .behavior(Behavior::Slow(3))
        .shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 10)
        .await;

    assert_eq!(outcome.state, PagerState::Sufficient);
    assert_eq!(outcome.anchors.len(), 10);
    // Every action eventually grew the page; none were wasted
    assert_eq!(outcome.actions, 2);
}

#[tokio::test]
async fn test_exhausted_page_stalls_without_acting() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let state = PageState::with_images(4, 4).status(Some("3")).shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 10)
        .await;

    assert_eq!(outcome.state, PagerState::Stalled);
    assert_eq!(outcome.stall_reason, Some(StallReason::NothingToLoad));
    assert_eq!(outcome.anchors.len(), 4);
    assert_eq!(outcome.actions, 0);
}

#[tokio::test]
async fn test_unknown_status_stalls() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let mut page = FakePage::new(PageState::with_images(4, 1).status(None).shared());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 3)
        .await;

    assert_eq!(outcome.state, PagerState::Stalled);
    assert_eq!(outcome.anchors.len(), 1);
}

#[tokio::test]
async fn test_page_that_never_updates_stalls_within_bound() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let state = PageState::with_images(10, 2)
        .status(Some("5"))
        .behavior(Behavior::Never)
        .shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 5)
        .await;

    assert_eq!(outcome.state, PagerState::Stalled);
    assert_eq!(outcome.stall_reason, Some(StallReason::NoProgress));
    assert_eq!(outcome.anchors.len(), 2);
    assert_eq!(outcome.actions, limits.max_idle_actions);
    assert_eq!(state.lock().unwrap().scrolls, limits.max_idle_actions);
}

#[tokio::test]
async fn test_never_updating_empty_page_returns_nothing() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let mut page = FakePage::new(
        PageState::with_images(0, 0)
            .behavior(Behavior::Never)
            .exhaust_when_done(false)
            .shared(),
    );

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 5)
        .await;

    assert_eq!(outcome.state, PagerState::Stalled);
    assert!(outcome.anchors.is_empty());
    assert!(outcome.actions <= limits.max_actions);
}

#[tokio::test]
async fn test_action_budget_bounds_slow_trickle() {
    let profile = SearchEngineProfile::default();
    let mut limits = fast_limits();
    limits.max_actions = 4;
    let state = PageState::with_images(100, 0).batch(1).shared();
    let mut page = FakePage::new(state.clone());

    let outcome = ResultPager::new(&profile, &limits)
        .collect(&mut page, 50)
        .await;

    assert_eq!(outcome.state, PagerState::Stalled);
    assert_eq!(outcome.stall_reason, Some(StallReason::ActionBudget));
    assert_eq!(outcome.actions, 4);
    assert_eq!(outcome.anchors.len(), 4);
}

#[tokio::test]
async fn test_resolver_skips_anchors_without_image_url() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let urls = image_urls(4);
    let pool = vec![
        Some(urls[0].clone()),
        None,
        Some(urls[2].clone()),
        Some(urls[3].clone()),
    ];
    let state = PageState::new(pool, 4).shared();
    let mut page = FakePage::new(state.clone());
    let anchors = imgacquire::scrapers::ElementRef::all(&profile.selectors.anchor, 4);

    let resolved = AnchorResolver::new(&profile, &limits)
        .resolve_all(&mut page, &anchors, 3)
        .await;

    // Only the first three anchors are considered
    assert_eq!(resolved, vec![urls[0].clone(), urls[2].clone()]);
    assert_eq!(state.lock().unwrap().context_clicks, 3);
}

#[tokio::test]
async fn test_resolver_waits_for_slow_links() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let mut page = FakePage::new(
        PageState::with_images(2, 2)
            .behavior(Behavior::Slow(3))
            .shared(),
    );
    let anchors = imgacquire::scrapers::ElementRef::all(&profile.selectors.anchor, 2);

    let resolved = AnchorResolver::new(&profile, &limits)
        .resolve_all(&mut page, &anchors, 2)
        .await;

    assert_eq!(resolved, image_urls(2));
}

#[tokio::test]
async fn test_resolver_gives_up_on_links_that_never_populate() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let mut page = FakePage::new(
        PageState::with_images(3, 3)
            .behavior(Behavior::Never)
            .shared(),
    );
    let anchors = imgacquire::scrapers::ElementRef::all(&profile.selectors.anchor, 3);

    let resolved = AnchorResolver::new(&profile, &limits)
        .resolve_all(&mut page, &anchors, 3)
        .await;

    assert!(resolved.is_empty());
}

#[tokio::test]
async fn test_extractor_closes_session() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let launcher = FakeLauncher::new(PageState::with_images(8, 3));

    let urls = ImageExtractor::new(&profile, &limits, &launcher)
        .extract("https://search.test/?q=cats", 6)
        .await
        .unwrap();

    assert_eq!(urls, image_urls(6));
    assert_eq!(launcher.launch_count(), 1);
    assert!(launcher.state.lock().unwrap().closed);
}

#[tokio::test]
async fn test_extractor_propagates_launch_failure() {
    let profile = SearchEngineProfile::default();
    let limits = fast_limits();
    let launcher = FakeLauncher::failing();

    let result = ImageExtractor::new(&profile, &limits, &launcher)
        .extract("https://search.test/?q=cats", 3)
        .await;

    assert!(matches!(result, Err(SessionError::Launch(_))));
}
