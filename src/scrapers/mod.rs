//! Page automation and HTTP access used to acquire image URLs.

pub mod browser;
pub mod http_client;
pub mod search;

pub use browser::{
    BrowserEngineConfig, ChromiumLauncher, ElementRef, Interaction, PageSession, SessionLauncher,
};
pub use http_client::{HeadResponse, HttpClient, ResourceFetcher};
pub use search::{
    extract_image_url, next_state, AnchorResolver, ImageExtractor, PageObservation,
    PaginationOutcome, PagerState, QueryUrlBuilder, ResultPager, StallReason,
};
