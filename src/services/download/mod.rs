//! Materialize extracted image URLs as a log file or downloaded images.

mod classify;

pub use classify::{split_url_path, Classification, ContentTypeResolver};

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{Config, DownloadPolicy, PaginationLimits, SearchEngineProfile};
use crate::error::{FetchError, MaterializeError};
use crate::models::SearchRequest;
use crate::scrapers::browser::SessionLauncher;
use crate::scrapers::http_client::ResourceFetcher;
use crate::scrapers::search::{ImageExtractor, QueryUrlBuilder};
use crate::storage::PathAllocator;

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

/// Progress events emitted while a run materializes its URLs.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// Extraction finished with this many URLs
    UrlsExtracted { count: usize },
    /// Classification started for a URL
    Started { index: usize, url: String },
    /// Image written
    Completed {
        index: usize,
        url: String,
        path: PathBuf,
    },
    /// Content type not in the allow-list
    Skipped {
        index: usize,
        url: String,
        extension: String,
    },
    /// Network or filesystem error for this URL
    Failed {
        index: usize,
        url: String,
        error: String,
    },
}

/// Summary of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Extracted image URLs, in page order.
    pub urls: Vec<String>,
    /// Files written in download mode.
    pub written: Vec<PathBuf>,
    /// URLs rejected by the extension allow-list.
    pub skipped: usize,
    /// URLs whose fetch or write failed.
    pub failed: usize,
    /// Log written in URL-only mode.
    pub log_file: Option<PathBuf>,
}

enum Outcome {
    Written(PathBuf),
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs a [`SearchRequest`] end to end.
pub struct Materializer {
    profile: SearchEngineProfile,
    limits: PaginationLimits,
    policy: DownloadPolicy,
    allocator: PathAllocator,
    launcher: Arc<dyn SessionLauncher>,
    fetcher: Arc<dyn ResourceFetcher>,
    events: Option<mpsc::Sender<DownloadEvent>>,
}

impl Materializer {
    pub fn new(
        config: &Config,
        launcher: Arc<dyn SessionLauncher>,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Self {
        Self {
            profile: config.engine.clone(),
            limits: config.pagination.clone(),
            policy: config.download.clone(),
            allocator: PathAllocator::from_policy(&config.download),
            launcher,
            fetcher,
            events: None,
        }
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<DownloadEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Execute the request.
    ///
    /// A zero count does nothing: no browser, no network, no files. Only a
    /// failure to open the browser session or to write the URL log aborts the
    /// run; per-URL download problems are counted in the report.
    pub async fn run(&self, request: &SearchRequest) -> Result<MaterializeReport, MaterializeError> {
        if request.count() == 0 {
            debug!("Count is zero, nothing to do");
            return Ok(MaterializeReport::default());
        }

        let search_url = QueryUrlBuilder::new(&self.profile).build(request);
        info!("Searching images for '{}'", request.query());
        debug!("Search URL: {}", search_url);

        let urls = ImageExtractor::new(&self.profile, &self.limits, self.launcher.as_ref())
            .extract(&search_url, request.count())
            .await?;
        self.emit(DownloadEvent::UrlsExtracted { count: urls.len() })
            .await;

        let mut report = MaterializeReport {
            urls,
            ..Default::default()
        };

        if request.urls_only() {
            report.log_file = Some(self.write_log(request, &report.urls).await?);
        } else {
            self.download_all(request, &mut report).await;
        }

        Ok(report)
    }

    async fn write_log(
        &self,
        request: &SearchRequest,
        urls: &[String],
    ) -> Result<PathBuf, MaterializeError> {
        let stem: String = request
            .query()
            .chars()
            .take(self.policy.log_stem_max_chars)
            .collect();
        let target =
            self.allocator
                .allocate(request.destination(), &stem, &self.policy.log_extension)?;

        tokio::fs::write(&target.path, urls.join(LINE_SEPARATOR)).await?;
        info!("Wrote {} URLs to {}", urls.len(), target.path.display());

        Ok(target.path)
    }

    async fn download_all(&self, request: &SearchRequest, report: &mut MaterializeReport) {
        let resolver =
            ContentTypeResolver::new(self.fetcher.as_ref(), &self.policy, &self.allocator);

        for (index, url) in report.urls.iter().enumerate() {
            self.emit(DownloadEvent::Started {
                index,
                url: url.clone(),
            })
            .await;

            match self.download_one(&resolver, request, url).await {
                Ok(Outcome::Written(path)) => {
                    debug!("Saved {} to {}", url, path.display());
                    report.written.push(path.clone());
                    self.emit(DownloadEvent::Completed {
                        index,
                        url: url.clone(),
                        path,
                    })
                    .await;
                }
                Ok(Outcome::Rejected(extension)) => {
                    debug!("Skipping {} (extension '{}')", url, extension);
                    report.skipped += 1;
                    self.emit(DownloadEvent::Skipped {
                        index,
                        url: url.clone(),
                        extension,
                    })
                    .await;
                }
                Err(e) => {
                    warn!("Failed to download {}: {}", url, e);
                    report.failed += 1;
                    self.emit(DownloadEvent::Failed {
                        index,
                        url: url.clone(),
                        error: e.to_string(),
                    })
                    .await;
                }
            }
        }

        info!(
            "Downloaded {} of {} images ({} skipped, {} failed)",
            report.written.len(),
            report.urls.len(),
            report.skipped,
            report.failed
        );
    }

    async fn download_one(
        &self,
        resolver: &ContentTypeResolver<'_>,
        request: &SearchRequest,
        url: &str,
    ) -> Result<Outcome, ItemError> {
        let classification = resolver.classify(url).await?;
        if !resolver.accepts(&classification) {
            return Ok(Outcome::Rejected(classification.extension));
        }

        // Fetch before allocating so a failed fetch leaves no file behind
        let bytes = self.fetcher.get_bytes(url).await?;
        let target = self.allocator.allocate(
            request.destination(),
            &classification.stem,
            &classification.extension,
        )?;
        tokio::fs::write(&target.path, bytes).await?;

        Ok(Outcome::Written(target.path))
    }

    async fn emit(&self, event: DownloadEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}
