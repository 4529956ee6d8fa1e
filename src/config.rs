//! Configuration for image acquisition.
//!
//! Every table the pipeline depends on (endpoint, selectors, filter tokens,
//! allow-lists) lives in an explicit value built here and handed to each
//! component, so differently configured instances can coexist.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::FilterCategory;
use crate::scrapers::BrowserEngineConfig;

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Browser launch settings.
    pub browser: BrowserEngineConfig,
    /// Search endpoint, page selectors and filter tokens.
    pub engine: SearchEngineProfile,
    /// File naming and allow-list rules.
    pub download: DownloadPolicy,
    /// Bounds on the pagination loop.
    pub pagination: PaginationLimits,
    /// HTTP client settings for HEAD/GET of image URLs.
    pub http: HttpConfig,
    /// Path this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        config.resolve_relative_paths();
        Ok(config)
    }

    /// Make file paths in the config relative to the config file's directory.
    fn resolve_relative_paths(&mut self) {
        let Some(base_dir) = self.base_dir() else {
            return;
        };
        if let Some(ref chrome_path) = self.browser.chrome_path {
            self.browser.chrome_path =
                Some(resolve_path(&chrome_path.to_string_lossy(), &base_dir));
        }
    }

    /// Parse configuration text in the given format (`toml`, `yaml`/`yml`, otherwise JSON).
    pub fn parse(contents: &str, format: &str) -> Result<Self, String> {
        match format {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }
}

/// Resolve a user-supplied path: `~` is expanded, relative paths join `base_dir`.
pub fn resolve_path(path_str: &str, base_dir: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(path_str);
    let path = Path::new(expanded.as_ref());

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// CSS selectors for the elements the pager and resolver work with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Result anchors; each loads the original image URL into its link once interacted with.
    pub anchor: String,
    /// Element carrying the pagination status attribute.
    pub status: String,
    /// "Show more results" control.
    pub load_more: String,
    /// Element that receives the End key to trigger lazy loading.
    pub body: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            anchor: "a.wXeWr.islib.nfEiy.mM5pbd".to_string(),
            status: "div.DwpMZe".to_string(),
            load_more: "input.mye4qd".to_string(),
            body: "body".to_string(),
        }
    }
}

/// Raw values of the status attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCodes {
    pub loading: String,
    pub has_more: String,
    pub exhausted: String,
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            loading: "1".to_string(),
            has_more: "5".to_string(),
            exhausted: "3".to_string(),
        }
    }
}

/// Tokens for one filter category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCategoryTable {
    /// Key used in the composite filter parameter (`isz`, `ic`, ...).
    pub key: String,
    /// Lowercase human label to site token.
    pub tokens: BTreeMap<String, String>,
}

impl FilterCategoryTable {
    fn new(key: &str, tokens: &[(&str, &str)]) -> Self {
        Self {
            key: key.to_string(),
            tokens: tokens
                .iter()
                .map(|(label, token)| (label.to_string(), token.to_string()))
                .collect(),
        }
    }
}

/// Category to (label to token) mapping. Defines the only valid filter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterTable {
    categories: BTreeMap<FilterCategory, FilterCategoryTable>,
}

impl FilterTable {
    pub fn new(categories: BTreeMap<FilterCategory, FilterCategoryTable>) -> Self {
        Self { categories }
    }

    /// Look up `label` (case-insensitive) and return the `key:token` pair.
    pub fn lookup(&self, category: FilterCategory, label: &str) -> Option<String> {
        let table = self.categories.get(&category)?;
        table
            .tokens
            .get(&label.trim().to_lowercase())
            .map(|token| format!("{}:{}", table.key, token))
    }

    /// Recognized labels for a category.
    pub fn labels(&self, category: FilterCategory) -> Vec<&str> {
        self.categories
            .get(&category)
            .map(|t| t.tokens.keys().map(|k| k.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn key(&self, category: FilterCategory) -> Option<&str> {
        self.categories.get(&category).map(|t| t.key.as_str())
    }
}

impl Default for FilterTable {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            FilterCategory::Size,
            FilterCategoryTable::new("isz", &[("large", "l"), ("medium", "m"), ("icon", "i")]),
        );
        categories.insert(
            FilterCategory::Color,
            FilterCategoryTable::new(
                "ic",
                &[
                    ("black and white", "gray"),
                    ("transparent", "trans"),
                    ("red", "specific,isc:red"),
                    ("orange", "specific,isc:orange"),
                    ("yellow", "specific,isc:yellow"),
                    ("green", "specific,isc:green"),
                    ("teal", "specific,isc:teal"),
                    ("blue", "specific,isc:blue"),
                    ("purple", "specific,isc:purple"),
                    ("pink", "specific,isc:pink"),
                    ("white", "specific,isc:white"),
                    ("gray", "specific,isc:gray"),
                    ("black", "specific,isc:black"),
                    ("brown", "specific,isc:brown"),
                ],
            ),
        );
        categories.insert(
            FilterCategory::Type,
            FilterCategoryTable::new(
                "itp",
                &[
                    ("clip art", "clipart"),
                    ("line drawing", "lineart"),
                    ("gif", "animated"),
                ],
            ),
        );
        categories.insert(
            FilterCategory::Time,
            FilterCategoryTable::new(
                "qdr",
                &[
                    ("past 24 hours", "d"),
                    ("past week", "w"),
                    ("past month", "m"),
                    ("past year", "y"),
                ],
            ),
        );
        categories.insert(
            FilterCategory::License,
            FilterCategoryTable::new(
                "il",
                &[
                    ("creative commons licenses", "cl"),
                    ("commercial & other licenses", "ol"),
                ],
            ),
        );
        Self { categories }
    }
}

/// Everything specific to the image search site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchEngineProfile {
    /// Endpoint including the trailing `?`.
    pub base_url: String,
    /// Fixed parameters selecting image-search mode and locale.
    pub mode_params: Vec<(String, String)>,
    pub query_param: String,
    pub safe_param: String,
    pub safe_on: String,
    pub safe_off: String,
    /// Composite filter parameter; its colons are sent unencoded.
    pub filter_param: String,
    pub selectors: Selectors,
    pub status_attribute: String,
    pub status_codes: StatusCodes,
    pub link_attribute: String,
    /// Query-string key in an anchor link that carries the original image URL.
    pub image_url_key: String,
    pub filters: FilterTable,
}

impl Default for SearchEngineProfile {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search?".to_string(),
            mode_params: vec![
                ("tbm".to_string(), "isch".to_string()),
                ("source".to_string(), "lmns".to_string()),
                ("hl".to_string(), "en".to_string()),
            ],
            query_param: "q".to_string(),
            safe_param: "safe".to_string(),
            safe_on: "active".to_string(),
            safe_off: "images".to_string(),
            filter_param: "tbs".to_string(),
            selectors: Selectors::default(),
            status_attribute: "data-status".to_string(),
            status_codes: StatusCodes::default(),
            link_attribute: "href".to_string(),
            image_url_key: "imgurl".to_string(),
            filters: FilterTable::default(),
        }
    }
}

/// Which extension wins when both the URL path and the declared content type give one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPriority {
    /// Server-declared content type always wins; no header means no extension.
    #[default]
    Declared,
    /// An allowed path extension is kept; the content type is used otherwise.
    Path,
}

/// Rules for naming and accepting downloaded files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadPolicy {
    pub allowed_extensions: Vec<String>,
    /// Characters stripped from file stems.
    pub forbidden_chars: String,
    /// Stem used when sanitization leaves nothing.
    pub default_stem: String,
    pub log_extension: String,
    /// URL-only mode names its log after the query, cut to this many characters.
    pub log_stem_max_chars: usize,
    pub extension_priority: ExtensionPriority,
}

impl DownloadPolicy {
    pub fn allows(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "gif", "jpg", "jpeg", "webp", "bmp", "svg", "ico"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            forbidden_chars: "\\/:*?<>|".to_string(),
            default_stem: "file".to_string(),
            log_extension: "log".to_string(),
            log_stem_max_chars: 20,
            extension_priority: ExtensionPriority::Declared,
        }
    }
}

/// Bounds on the pagination loop and on waits for deferred page updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationLimits {
    /// Total load-more/scroll actions allowed per run.
    pub max_actions: usize,
    /// Consecutive actions without anchor growth before giving up.
    pub max_idle_actions: usize,
    /// How long to wait for the page to react to an action.
    pub settle_timeout_ms: u64,
    /// Interval between page re-reads while waiting.
    pub poll_interval_ms: u64,
    /// How long to wait for an anchor's link to be populated.
    pub link_timeout_ms: u64,
}

impl PaginationLimits {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_millis(self.link_timeout_ms)
    }
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            max_actions: 60,
            max_idle_actions: 8,
            settle_timeout_ms: 3000,
            poll_interval_ms: 250,
            link_timeout_ms: 1500,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// None: crate user agent; "impersonate": random browser agent; otherwise used verbatim.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            request_timeout: 30,
        }
    }
}
