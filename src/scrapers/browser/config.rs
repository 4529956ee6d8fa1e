//! Browser engine configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Skip image loading in the results page (default: true).
    /// Only anchor links are needed, never the rendered thumbnails.
    #[serde(default = "default_disable_images")]
    pub disable_images: bool,

    /// Explicit Chrome/Chromium executable. Searched for when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080"), also used for image downloads.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Page load timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_images: default_disable_images(),
            chrome_path: None,
            proxy: None,
            timeout: default_timeout(),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_disable_images() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}
