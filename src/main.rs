use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use habr_scrape::config::{DEFAULT_CATALOG_PAGES, DEFAULT_HUB_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use habr_scrape::habr_client::{hubs_catalog_url, list_hub_urls};
use habr_scrape::pipeline::{build_posts_table, list_hubs};
use habr_scrape::{HabrClient, HtmlCache, PostRecord, RecordStore, ScrapeConfig};

#[derive(Parser)]
#[command(name = "habr_scrape")]
#[command(version)]
#[command(about = "Scrape Habr hubs and post listings into a CSV table", long_about = None)]
struct Cli {
    #[arg(long, value_name = "DIR", env = "HABR_SCRAPE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Year for posts listed without one (defaults to this year)
    #[arg(long, value_name = "YEAR", env = "HABR_SCRAPE_CURRENT_YEAR")]
    current_year: Option<i32>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS", env = "HABR_SCRAPE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[arg(long, default_value_t = DEFAULT_CATALOG_PAGES)]
    catalog_pages: u32,

    #[arg(long, default_value_t = DEFAULT_HUB_PAGE_SIZE)]
    page_size: u64,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the hub catalog pages
    FetchHubs,

    /// List hubs from the cached catalog
    Hubs,

    /// Download every listing page of every hub
    FetchPosts {
        /// Download pages that are already cached again
        #[arg(long)]
        refetch: bool,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,
    },

    /// Parse cached listing pages into the posts table
    Parse,

    /// Summarize the posts table
    Posts,
}

impl Cli {
    fn config(&self) -> ScrapeConfig {
        let defaults = ScrapeConfig::default();
        ScrapeConfig {
            data_dir: self.data_dir.clone(),
            current_year: self.current_year.unwrap_or(defaults.current_year),
            timeout_secs: self.timeout,
            catalog_pages: self.catalog_pages,
            hub_page_size: self.page_size,
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    habr_scrape::logging::init_logger(cli.verbose);

    let config = cli.config();
    config.validate().context("Invalid configuration")?;
    let cache = HtmlCache::new(config.cache_dir());

    match cli.command {
        Commands::FetchHubs => cmd_fetch_hubs(&config, cache),
        Commands::Hubs => cmd_hubs(&config, &cache),
        Commands::FetchPosts { refetch, limit } => cmd_fetch_posts(&config, cache, refetch, limit),
        Commands::Parse => cmd_parse(&config, &cache),
        Commands::Posts => cmd_posts(&config),
    }
}

fn cmd_fetch_hubs(config: &ScrapeConfig, cache: HtmlCache) -> Result<()> {
    let client = HabrClient::new(config, cache).context("Failed to create HTTP client")?;
    let urls = (1..=config.catalog_pages).map(hubs_catalog_url);
    client.fetch_all(urls).context("Failed to cache catalog pages")?;
    Ok(())
}

fn cmd_hubs(config: &ScrapeConfig, cache: &HtmlCache) -> Result<()> {
    let mut hubs = list_hubs(cache, config.catalog_pages).context("Failed to read hub catalog")?;
    hubs.sort_by(|a, b| b.subscribers.cmp(&a.subscribers));

    println!("{:<32} {:>12} {:>8}  name", "id", "subscribers", "posts");
    for hub in &hubs {
        println!("{:<32} {:>12} {:>8}  {}", hub.id, hub.subscribers, hub.posts, hub.name);
    }
    Ok(())
}

fn cmd_fetch_posts(
    config: &ScrapeConfig,
    cache: HtmlCache,
    refetch: bool,
    limit: Option<usize>,
) -> Result<()> {
    let hubs = list_hubs(&cache, config.catalog_pages).context("Failed to read hub catalog")?;
    let mut urls = list_hub_urls(&hubs, config.hub_page_size);
    let total = urls.len();

    if !refetch {
        let cached = cache.cached_urls().context("Failed to read cache index")?;
        urls.retain(|url| !cached.contains(url));
    }
    if let Some(limit) = limit {
        urls.truncate(limit);
    }
    info!("{} of {} hub pages to fetch", urls.len(), total);

    let client = HabrClient::new(config, cache).context("Failed to create HTTP client")?;
    client.fetch_all(&urls).context("Failed to cache hub pages")?;
    Ok(())
}

fn cmd_parse(config: &ScrapeConfig, cache: &HtmlCache) -> Result<()> {
    let hubs = list_hubs(cache, config.catalog_pages).context("Failed to read hub catalog")?;
    let urls = list_hub_urls(&hubs, config.hub_page_size);
    let store = RecordStore::new(config.posts_path());

    let saved = build_posts_table(cache, &urls, config.current_year, &store)
        .context("Failed to build posts table")?;
    println!("Saved {} unique posts to {}", saved, store.path().display());
    Ok(())
}

fn cmd_posts(config: &ScrapeConfig) -> Result<()> {
    let store = RecordStore::new(config.posts_path());
    let posts = store
        .load_all()
        .with_context(|| format!("Failed to open {}", store.path().display()))?
        .collect::<habr_scrape::Result<Vec<PostRecord>>>()
        .context("Failed to read posts table")?;

    let undated = posts.iter().filter(|post| post.date.is_none()).count();
    let first = posts.iter().filter_map(|post| post.date).min();
    let last = posts.iter().filter_map(|post| post.date).max();
    let views: u64 = posts.iter().map(|post| post.views).sum();

    println!("Posts:     {}", posts.len());
    println!("Undated:   {}", undated);
    if let (Some(first), Some(last)) = (first, last) {
        println!("Dates:     {} .. {}", first, last);
    }
    println!("Views:     {}", views);
    Ok(())
}
