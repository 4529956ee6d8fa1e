//! Command-line interface.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod fetch;
mod filters;
mod progress;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use imgacquire::config::{resolve_path, Config};
use imgacquire::models::{SearchFilters, SearchRequest};

#[derive(Parser)]
#[command(name = "imgacq")]
#[command(about = "Extract full-resolution image URLs from image search results and download them")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "IMGACQUIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Search, then download images (or only log their URLs)
    Fetch(fetch::FetchArgs),

    /// Print the search URL a query would open, without running it
    Url {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// List filter categories and the labels each one accepts
    Filters,
}

/// Safe-search switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SafeSearch {
    On,
    Off,
}

/// Query and filter arguments shared by `fetch` and `url`.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Search query
    query: String,

    /// Safe-search (omitted from the URL when not given)
    #[arg(long, value_enum)]
    safe_search: Option<SafeSearch>,

    /// Size filter (e.g. "large", "medium", "icon")
    #[arg(long)]
    size: Option<String>,

    /// Color filter (e.g. "black and white", "transparent", "red")
    #[arg(long)]
    color: Option<String>,

    /// Type filter (e.g. "clip art", "line drawing", "gif")
    #[arg(long = "type")]
    kind: Option<String>,

    /// Time filter (e.g. "past week")
    #[arg(long)]
    time: Option<String>,

    /// Usage rights filter (e.g. "creative commons licenses")
    #[arg(long)]
    license: Option<String>,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new();
        if let Some(ref label) = self.size {
            filters = filters.size(label.as_str());
        }
        if let Some(ref label) = self.color {
            filters = filters.color(label.as_str());
        }
        if let Some(ref label) = self.kind {
            filters = filters.kind(label.as_str());
        }
        if let Some(ref label) = self.time {
            filters = filters.time(label.as_str());
        }
        if let Some(ref label) = self.license {
            filters = filters.license(label.as_str());
        }
        filters
    }

    /// Build a request with these search arguments applied.
    pub fn to_request(&self, count: usize, destination: PathBuf, urls_only: bool) -> SearchRequest {
        let mut request = SearchRequest::new(self.query.as_str(), count, destination, urls_only);
        if let Some(safe) = self.safe_search {
            request.apply_safe_search(safe == SafeSearch::On);
        }
        request.apply_search_filters(self.filters());
        request
    }
}

async fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let path = resolve_path(&path.to_string_lossy(), &std::env::current_dir()?);
            Config::load_from_path(&path)
                .await
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Loading {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).await?;

    match cli.command {
        Commands::Fetch(args) => fetch::cmd_fetch(config, args).await,
        Commands::Url { search } => filters::cmd_url(&config, &search),
        Commands::Filters => filters::cmd_filters(&config),
    }
}
