//! Progress display for a fetch run.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use imgacquire::services::DownloadEvent;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Render download events until the sender side is dropped.
pub async fn render(mut event_rx: mpsc::Receiver<DownloadEvent>, query: String) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner.set_message(format!("Collecting results for '{}'...", query));

    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = event_rx.recv().await {
        match event {
            DownloadEvent::UrlsExtracted { count } => {
                spinner.finish_and_clear();
                let progress = ProgressBar::new(count as u64);
                progress.set_style(bar_style());
                bar = Some(progress);
            }
            DownloadEvent::Started { url, .. } => {
                if let Some(ref progress) = bar {
                    progress.set_message(url);
                }
            }
            DownloadEvent::Completed { .. }
            | DownloadEvent::Skipped { .. }
            | DownloadEvent::Failed { .. } => {
                if let Some(ref progress) = bar {
                    progress.inc(1);
                }
            }
        }
    }

    spinner.finish_and_clear();
    if let Some(progress) = bar {
        progress.finish_and_clear();
    }
}
