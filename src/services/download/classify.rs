//! File name and type resolution for image URLs.

use tracing::debug;

use crate::config::{DownloadPolicy, ExtensionPriority};
use crate::error::FetchError;
use crate::scrapers::http_client::ResourceFetcher;
use crate::storage::PathAllocator;
use crate::utils::{content_type_extension, path_extension};

/// Stem and extension chosen for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Sanitized stem from the URL path.
    pub stem: String,
    /// Resolved extension; empty when none could be determined.
    pub extension: String,
}

/// Decoded basename of a URL path split into (stem, recognizable extension).
///
/// The stem always drops the last `.suffix`, even when the suffix is not a
/// recognizable extension.
pub fn split_url_path(url: &str) -> Result<(String, Option<String>), FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

    let raw = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let basename = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    let stem = match basename.rfind('.') {
        Some(pos) if pos > 0 => basename[..pos].to_string(),
        _ => basename.clone(),
    };

    Ok((stem, path_extension(&basename)))
}

/// Classifies URLs into (stem, extension) and decides whether they may be downloaded.
pub struct ContentTypeResolver<'a> {
    fetcher: &'a dyn ResourceFetcher,
    policy: &'a DownloadPolicy,
    allocator: &'a PathAllocator,
}

impl<'a> ContentTypeResolver<'a> {
    pub fn new(
        fetcher: &'a dyn ResourceFetcher,
        policy: &'a DownloadPolicy,
        allocator: &'a PathAllocator,
    ) -> Self {
        Self {
            fetcher,
            policy,
            allocator,
        }
    }

    /// Resolve the stem and extension for `url`.
    ///
    /// With [`ExtensionPriority::Declared`] a HEAD request is always made and
    /// its content type decides; no content type means no extension. With
    /// [`ExtensionPriority::Path`] an allowed path extension is used as is and
    /// the HEAD request only happens when the path gives none.
    pub async fn classify(&self, url: &str) -> Result<Classification, FetchError> {
        let (raw_stem, from_path) = split_url_path(url)?;
        let stem = self.allocator.sanitize(&raw_stem);

        if self.policy.extension_priority == ExtensionPriority::Path {
            if let Some(ext) = from_path.as_ref().filter(|e| self.policy.allows(e)) {
                return Ok(Classification {
                    stem,
                    extension: ext.clone(),
                });
            }
        }

        let head = self.fetcher.head(url).await?;
        let declared = head
            .content_type()
            .map(content_type_extension)
            .filter(|e| !e.is_empty());

        debug!(
            "{}: path extension {:?}, declared {:?}",
            url, from_path, declared
        );

        Ok(Classification {
            stem,
            extension: declared.unwrap_or_default(),
        })
    }

    /// Whether a classification passes the extension allow-list.
    pub fn accepts(&self, classification: &Classification) -> bool {
        self.policy.allows(&classification.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_path() {
        assert_eq!(
            split_url_path("https://a.test/img/cute%20cat.JPG?size=l").unwrap(),
            ("cute cat".to_string(), Some("jpg".to_string()))
        );
        assert_eq!(
            split_url_path("https://a.test/photos/12345").unwrap(),
            ("12345".to_string(), None)
        );
        assert_eq!(
            split_url_path("https://a.test/").unwrap(),
            ("".to_string(), None)
        );
        assert_eq!(
            split_url_path("https://a.test/pic.jpg-large").unwrap(),
            ("pic".to_string(), None)
        );
    }

    #[test]
    fn test_split_rejects_relative_url() {
        assert!(matches!(
            split_url_path("/no/scheme.png"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
