//! HTTP response wrappers.

use std::collections::HashMap;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// HEAD response wrapper (no body, just headers).
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: StatusCode,
    /// Header values keyed by lowercase name.
    pub headers: HashMap<String, String>,
}

impl HeadResponse {
    pub fn new(status: StatusCode, headers: HashMap<String, String>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { status, headers }
    }

    pub(crate) fn from_header_map(status: StatusCode, map: &HeaderMap) -> Self {
        let headers = map
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self::new(status, headers)
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get("content-type")
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}
