//! Data models for image acquisition runs.

mod filters;
mod page;
mod request;

pub use filters::{FilterCategory, SearchFilters};
pub use page::{FileTarget, PageStatus};
pub use request::SearchRequest;
