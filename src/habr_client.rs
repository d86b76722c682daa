use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::cache::HtmlCache;
use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::models::HubRecord;

pub const SITE_URL: &str = "https://habrahabr.ru";

pub fn hubs_catalog_url(page: u32) -> String {
    format!("{}/hubs/page{}/", SITE_URL, page)
}

pub fn hub_page_url(id: &str, page: u64) -> String {
    format!("{}/hub/{}/all/page{}/", SITE_URL, id, page)
}

/// Number of `size`-post pages needed for `total` posts. A zero page size
/// yields no pages.
pub fn pages_count(total: u64, size: u64) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(size)
}

/// Hub listing URLs, smallest hubs first, every page of each hub.
pub fn list_hub_urls(hubs: &[HubRecord], page_size: u64) -> Vec<String> {
    let mut sorted: Vec<&HubRecord> = hubs.iter().collect();
    sorted.sort_by_key(|hub| hub.posts);

    sorted
        .into_iter()
        .flat_map(|hub| {
            (1..=pages_count(hub.posts, page_size)).map(move |page| hub_page_url(&hub.id, page))
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    pub fetched: usize,
    pub failed: usize,
}

pub struct HabrClient {
    client: Client,
    cache: HtmlCache,
}

impl HabrClient {
    pub fn new(config: &ScrapeConfig, cache: HtmlCache) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client, cache })
    }

    pub fn cache(&self) -> &HtmlCache {
        &self.cache
    }

    /// Single best-effort GET. Any network failure becomes `None`.
    pub fn fetch(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}, caching body anyway", url, status);
        }

        match response.text() {
            Ok(html) => Some(html),
            Err(e) => {
                warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }

    /// Fetch `url` and cache whatever came back, empty content on failure.
    /// Returns whether the download succeeded; only disk errors are propagated.
    pub fn fetch_and_store(&self, url: &str) -> Result<bool> {
        let html = self.fetch(url);
        self.cache.store(url, html.as_deref())?;
        Ok(html.is_some())
    }

    pub fn fetch_all<I, S>(&self, urls: I) -> Result<FetchStats>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = FetchStats::default();
        for url in urls {
            let url = url.as_ref();
            debug!("Fetching {}", url);
            if self.fetch_and_store(url)? {
                stats.fetched += 1;
            } else {
                stats.failed += 1;
            }
        }
        info!(
            "Fetched {} pages ({} failed and cached empty)",
            stats.fetched + stats.failed,
            stats.failed
        );
        Ok(stats)
    }
}
