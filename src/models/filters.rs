//! Search filter selections.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A filter dimension offered by the image search page.
///
/// Declaration order is the order in which filter tokens are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Size,
    Color,
    Type,
    Time,
    License,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 5] = [
        FilterCategory::Size,
        FilterCategory::Color,
        FilterCategory::Type,
        FilterCategory::Time,
        FilterCategory::License,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Color => "color",
            Self::Type => "type",
            Self::Time => "time",
            Self::License => "license",
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form filter labels selected per category.
///
/// Labels are stored as given; they are matched case-insensitively against the
/// filter table when the search URL is built. Unknown labels are kept here and
/// simply produce no token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    selections: BTreeMap<FilterCategory, String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a label for a category, replacing any previous selection.
    pub fn with(mut self, category: FilterCategory, label: impl Into<String>) -> Self {
        self.set(category, label);
        self
    }

    pub fn set(&mut self, category: FilterCategory, label: impl Into<String>) {
        self.selections.insert(category, label.into());
    }

    pub fn size(self, label: impl Into<String>) -> Self {
        self.with(FilterCategory::Size, label)
    }

    pub fn color(self, label: impl Into<String>) -> Self {
        self.with(FilterCategory::Color, label)
    }

    pub fn kind(self, label: impl Into<String>) -> Self {
        self.with(FilterCategory::Type, label)
    }

    pub fn time(self, label: impl Into<String>) -> Self {
        self.with(FilterCategory::Time, label)
    }

    pub fn license(self, label: impl Into<String>) -> Self {
        self.with(FilterCategory::License, label)
    }

    pub fn get(&self, category: FilterCategory) -> Option<&str> {
        self.selections.get(&category).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Selections in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterCategory, &str)> {
        self.selections.iter().map(|(c, l)| (*c, l.as_str()))
    }
}
