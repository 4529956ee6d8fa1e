//! Search request model.

use std::path::{Path, PathBuf};

use super::SearchFilters;

/// One acquisition run: what to search for and where the results go.
///
/// Fields are fixed at construction; only safe-search and filter selections
/// can be applied afterwards, before the run executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    count: usize,
    destination: PathBuf,
    urls_only: bool,
    filters: SearchFilters,
    safe_search: Option<bool>,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        count: usize,
        destination: impl Into<PathBuf>,
        urls_only: bool,
    ) -> Self {
        Self {
            query: query.into(),
            count,
            destination: destination.into(),
            urls_only,
            filters: SearchFilters::default(),
            safe_search: None,
        }
    }

    /// Turn safe-search on (`true`) or explicitly off (`false`).
    ///
    /// Requests that never call this send no safe-search parameter at all.
    pub fn apply_safe_search(&mut self, safe: bool) {
        self.safe_search = Some(safe);
    }

    /// Replace the filter selections.
    pub fn apply_search_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn urls_only(&self) -> bool {
        self.urls_only
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn safe_search(&self) -> Option<bool> {
        self.safe_search
    }
}
