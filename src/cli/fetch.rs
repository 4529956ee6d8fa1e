//! The `fetch` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use console::style;
use tokio::sync::mpsc;

use imgacquire::config::{resolve_path, Config};
use imgacquire::scrapers::{ChromiumLauncher, HttpClient};
use imgacquire::services::{DownloadEvent, MaterializeReport, Materializer};

use super::{progress, SearchArgs};

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Number of images to collect
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Destination folder (created if missing)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Write the URLs to a log file instead of downloading
    #[arg(long)]
    pub urls_only: bool,

    /// Show the browser window
    #[arg(long)]
    pub no_headless: bool,

    /// Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Connect to a running browser's DevTools endpoint instead of launching one
    #[arg(long, env = "BROWSER_URL")]
    pub remote_url: Option<String>,
}

impl FetchArgs {
    fn apply_overrides(&self, config: &mut Config) {
        if self.no_headless {
            config.browser.headless = false;
        }
        if let Some(ref path) = self.chrome_path {
            config.browser.chrome_path = Some(path.clone());
        }
        if let Some(ref url) = self.remote_url {
            config.browser.remote_url = Some(url.clone());
        }
    }
}

pub async fn cmd_fetch(mut config: Config, args: FetchArgs) -> anyhow::Result<()> {
    args.apply_overrides(&mut config);

    let destination = resolve_path(&args.output.to_string_lossy(), &std::env::current_dir()?);
    let request = args
        .search
        .to_request(args.count, destination, args.urls_only);

    let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone()));
    let fetcher = Arc::new(
        HttpClient::new(&config.http, config.browser.proxy.as_deref())
            .context("Building HTTP client")?,
    );

    let (event_tx, event_rx) = mpsc::channel::<DownloadEvent>(100);
    let ui = tokio::spawn(progress::render(event_rx, request.query().to_string()));

    let report = {
        let materializer = Materializer::new(&config, launcher, fetcher).with_events(event_tx);
        materializer.run(&request).await
    };
    let _ = ui.await;

    let report = report.with_context(|| format!("Search for '{}' failed", request.query()))?;
    print_summary(&report, args.count);
    Ok(())
}

fn print_summary(report: &MaterializeReport, requested: usize) {
    if requested == 0 {
        println!("{} Nothing requested", style("!").yellow());
        return;
    }

    let found = report.urls.len();
    let marker = if found < requested {
        style("!").yellow()
    } else {
        style("✓").green()
    };
    println!("{} Found {} of {} image URLs", marker, found, requested);

    if let Some(ref log_file) = report.log_file {
        println!("  {} {}", style("→").cyan(), log_file.display());
        return;
    }

    println!(
        "  {} Downloaded {} ({} skipped, {} failed)",
        style("→").cyan(),
        report.written.len(),
        report.skipped,
        report.failed
    );
    for path in &report.written {
        println!("    {}", style(path.display()).dim());
    }
}
