//! Anime Catalog - Command-Line Surface
//!
//! Thin headless front end over `anime-catalog-core`. Loads configuration,
//! wires a [`JikanClient`] into the list and detail controllers, and renders
//! their state as plain text.
//!
//! # Usage
//!
//! ```bash
//! # First page of the top list
//! anime-catalog top
//!
//! # First three pages
//! anime-catalog top --pages 3
//!
//! # Detail for one title
//! anime-catalog show 5114
//!
//! # Against a different API root
//! anime-catalog --base-url http://localhost:8080/v4 top
//!
//! # Verbose logging
//! RUST_LOG=debug anime-catalog top
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use anime_catalog_core::{
    load_config, load_config_from_path, CatalogClient, CatalogConfig, CatalogItem,
    ConfigOverrides, ConnectivityObserver, DetailLoader, JikanClient, ListSnapshot, LoadOutcome,
    PaginationController, RouteProbe,
};

/// Browse the top anime list and individual titles
#[derive(Parser, Debug)]
#[command(name = "anime-catalog")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalog API root (overrides config and environment)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides config and environment)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short = 'l',
        long,
        global = true,
        env = "ANIME_CATALOG_LOG_LEVEL",
        default_value = "warn"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List the top-rated titles
    Top {
        /// Number of pages to load (defaults to list.prefetch_pages)
        #[arg(short = 'p', long, value_parser = clap::value_parser!(u32).range(1..))]
        pages: Option<u32>,
    },

    /// Show details for one title
    Show {
        /// Catalog identifier
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: u32,
    },
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so listings on stdout stay clean.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "anime_catalog={level},anime_catalog_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Resolve configuration from file, environment and CLI flags
fn resolve_config(args: &Args) -> Result<CatalogConfig> {
    let mut config = match args.config {
        Some(ref path) => load_config_from_path(Some(path.clone()))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config().context("Failed to load config")?,
    };

    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = args.base_url {
        overrides = overrides.with_base_url(url.clone());
    }
    if let Some(secs) = args.timeout {
        overrides = overrides.with_timeout_secs(secs);
    }
    if let Command::Top { pages: Some(pages) } = args.command {
        overrides = overrides.with_prefetch_pages(pages);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    debug!(
        source = %config.source(),
        base_url = %config.client.base_url,
        "Configuration resolved"
    );
    Ok(config)
}

// ============================================================================
// Rendering
// ============================================================================

fn offline_banner() -> &'static str {
    "You're offline. Results may be unavailable until the connection returns."
}

fn format_list_row(rank: usize, item: &CatalogItem) -> String {
    let episodes = item
        .episodes
        .map_or_else(|| "? eps".to_string(), |n| format!("{n} eps"));
    format!("{rank:>4}. [{}] {} ({episodes})", item.id, item.title)
}

fn format_detail(item: &CatalogItem) -> String {
    let mut out = format!("{} [{}]\n", item.title, item.id);

    if let Some(episodes) = item.episodes {
        out.push_str(&format!("Episodes:  {episodes}\n"));
    }
    if let Some(ref rating) = item.rating {
        out.push_str(&format!("Rating:    {rating}\n"));
    }
    if !item.genres.is_empty() {
        out.push_str(&format!("Genres:    {}\n", item.genres.join(", ")));
    }
    if !item.producers.is_empty() {
        out.push_str(&format!("Producers: {}\n", item.producers.join(", ")));
    }
    if let Some(url) = item.trailer.as_ref().and_then(|t| t.watch_url()) {
        out.push_str(&format!("Trailer:   {url}\n"));
    }
    if let Some(ref image) = item.image_url {
        out.push_str(&format!("Image:     {image}\n"));
    }
    if let Some(ref synopsis) = item.synopsis {
        out.push('\n');
        out.push_str(synopsis);
        out.push('\n');
    }

    out
}

// ============================================================================
// Commands
// ============================================================================

/// Start a fresh list session and load up to `pages` pages
async fn load_top<C: CatalogClient + ?Sized + 'static>(
    client: Arc<C>,
    observer: ConnectivityObserver,
    pages: u32,
) -> Result<ListSnapshot> {
    let list = PaginationController::new(client).with_connectivity(observer);

    for index in 0..pages {
        let pending = if index == 0 {
            list.reset()
        } else {
            list.load_next_page()
        };
        let Some(pending) = pending else {
            break;
        };

        let requested = pending.target();
        if pending.wait().await != LoadOutcome::Applied {
            anyhow::bail!("Failed to load page {requested}");
        }
        if list.is_exhausted() {
            break;
        }
    }

    Ok(list.snapshot())
}

async fn run_top<C: CatalogClient + ?Sized + 'static>(
    client: Arc<C>,
    observer: ConnectivityObserver,
    pages: u32,
) -> Result<()> {
    let snapshot = load_top(client, observer, pages).await?;

    for (index, item) in snapshot.items.iter().enumerate() {
        println!("{}", format_list_row(index + 1, item));
    }
    if snapshot.is_exhausted {
        println!("-- end of list --");
    } else {
        info!(next_page = snapshot.next_page, "More pages available");
    }

    Ok(())
}

async fn run_show<C: CatalogClient + ?Sized + 'static>(
    client: Arc<C>,
    observer: ConnectivityObserver,
    id: u32,
) -> Result<()> {
    let loader = DetailLoader::new(client).with_connectivity(observer);

    if let Some(pending) = loader.load(id) {
        pending.wait().await;
    }

    let item = loader
        .item()
        .with_context(|| format!("Could not load anime {id}"))?;
    print!("{}", format_detail(&item));

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "anime-catalog starting");

    let config = resolve_config(&args)?;

    let client = Arc::new(JikanClient::new(&config.client).context("Failed to build HTTP client")?);

    let observer = ConnectivityObserver::new(RouteProbe::new(config.probe_address));
    if !observer.is_connected() {
        warn!(probe = %config.probe_address, "Probe reports no route to the internet");
        eprintln!("{}", offline_banner());
    }

    match args.command {
        Command::Top { .. } => run_top(client, observer, config.prefetch_pages).await,
        Command::Show { id } => run_show(client, observer, id).await,
    }
}
