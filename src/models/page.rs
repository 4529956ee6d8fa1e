//! Page state signals and output file targets.

use std::path::PathBuf;

use crate::config::StatusCodes;

/// Pagination signal read from the results page's status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// The page is still fetching results.
    Loading,
    /// More results can be loaded by scrolling.
    HasMore,
    /// The page has reached the end of its results.
    Exhausted,
    /// Indicator missing or carrying an unrecognized value.
    Unknown,
}

impl PageStatus {
    /// Interpret the raw status attribute value.
    pub fn parse(raw: Option<&str>, codes: &StatusCodes) -> Self {
        match raw.map(str::trim) {
            Some(v) if v == codes.loading => Self::Loading,
            Some(v) if v == codes.has_more => Self::HasMore,
            Some(v) if v == codes.exhausted => Self::Exhausted,
            _ => Self::Unknown,
        }
    }

    /// Whether scrolling may still produce more results.
    pub fn allows_scroll(&self) -> bool {
        matches!(self, Self::Loading | Self::HasMore)
    }
}

/// Where one downloaded resource is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub stem: String,
    pub extension: String,
    pub path: PathBuf,
}
