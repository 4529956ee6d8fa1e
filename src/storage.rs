//! Output paths for downloaded images and URL logs.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::DownloadPolicy;
use crate::models::FileTarget;

/// Allocates sanitized, collision-free file paths inside a destination folder.
///
/// Uniqueness is checked against the filesystem at allocation time only;
/// nothing is reserved, so two processes writing the same folder can race.
#[derive(Debug, Clone)]
pub struct PathAllocator {
    forbidden_chars: String,
    default_stem: String,
}

impl PathAllocator {
    pub fn new(forbidden_chars: impl Into<String>, default_stem: impl Into<String>) -> Self {
        Self {
            forbidden_chars: forbidden_chars.into(),
            default_stem: default_stem.into(),
        }
    }

    pub fn from_policy(policy: &DownloadPolicy) -> Self {
        Self::new(policy.forbidden_chars.clone(), policy.default_stem.clone())
    }

    /// Strip forbidden characters; fall back to the default stem when nothing is left.
    pub fn sanitize(&self, stem: &str) -> String {
        let sanitized: String = stem
            .chars()
            .filter(|c| !self.forbidden_chars.contains(*c))
            .collect();

        if sanitized.is_empty() {
            self.default_stem.clone()
        } else {
            sanitized
        }
    }

    /// Pick `folder/stem.extension`, adding ` (1)`, ` (2)`, ... until the path is unused.
    ///
    /// Creates `folder` (and parents) if missing.
    pub fn allocate(&self, folder: &Path, stem: &str, extension: &str) -> io::Result<FileTarget> {
        if !folder.exists() {
            std::fs::create_dir_all(folder)?;
        }

        let stem = self.sanitize(stem);
        let mut candidate = stem.clone();
        let mut counter = 1u32;

        loop {
            let path = folder.join(file_name(&candidate, extension));
            if !path.exists() {
                return Ok(FileTarget {
                    stem: candidate,
                    extension: extension.to_string(),
                    path,
                });
            }
            candidate = format!("{} ({})", stem, counter);
            counter += 1;
        }
    }
}

fn file_name(stem: &str, extension: &str) -> PathBuf {
    if extension.is_empty() {
        PathBuf::from(stem)
    } else {
        PathBuf::from(format!("{}.{}", stem, extension))
    }
}
