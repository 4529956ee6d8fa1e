//! Search page URL construction.

use url::form_urlencoded::byte_serialize;

use crate::config::SearchEngineProfile;
use crate::models::{SearchFilters, SearchRequest};

/// Builds the image-search results URL for a request.
pub struct QueryUrlBuilder<'a> {
    profile: &'a SearchEngineProfile,
}

impl<'a> QueryUrlBuilder<'a> {
    pub fn new(profile: &'a SearchEngineProfile) -> Self {
        Self { profile }
    }

    /// Comma-joined `key:token` pairs for the recognized filter selections.
    ///
    /// Returns `None` when no selection matches the filter table.
    pub fn filter_value(&self, filters: &SearchFilters) -> Option<String> {
        let pairs: Vec<String> = filters
            .iter()
            .filter_map(|(category, label)| self.profile.filters.lookup(category, label))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join(","))
        }
    }

    /// Full URL: base endpoint, mode parameters, query text, then the
    /// optional safe-search and composite filter parameters.
    pub fn build(&self, request: &SearchRequest) -> String {
        let mut params: Vec<String> = self
            .profile
            .mode_params
            .iter()
            .map(|(k, v)| pair(k, v))
            .collect();

        params.push(pair(&self.profile.query_param, request.query()));

        if let Some(safe) = request.safe_search() {
            let token = if safe {
                &self.profile.safe_on
            } else {
                &self.profile.safe_off
            };
            params.push(pair(&self.profile.safe_param, token));
        }

        if let Some(value) = self.filter_value(request.filters()) {
            // The site rejects an encoded colon in this parameter
            params.push(pair(&self.profile.filter_param, &value).replace("%3A", ":"));
        }

        format!("{}{}", self.profile.base_url, params.join("&"))
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", encode(key), encode(value))
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}
