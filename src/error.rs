//! Error types for image acquisition.

use thiserror::Error;

/// Errors from the automated browser session.
///
/// `Launch` and `Navigation` are fatal for a run. The rest surface only from
/// individual page commands, which callers degrade rather than propagate.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Failed to open {url}: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Browser command failed: {0}")]
    Command(String),
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    Unavailable,
}

/// Errors from fetching a single remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned HTTP {0}")]
    Status(u16),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
