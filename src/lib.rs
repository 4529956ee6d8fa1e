//! imgacquire - image search result acquisition.
//!
//! Drives a browser through an image search results page until enough result
//! anchors are loaded, resolves each anchor to its full-resolution image URL,
//! then either logs the URLs or downloads the images under safe, unique names.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::{FetchError, MaterializeError, SessionError};
pub use models::{FilterCategory, SearchFilters, SearchRequest};
pub use services::{MaterializeReport, Materializer};
