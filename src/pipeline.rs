use tracing::{debug, info};

use crate::cache::HtmlCache;
use crate::dedup::unique_post_results;
use crate::error::{Result, ScrapeError};
use crate::habr_client::hubs_catalog_url;
use crate::models::{HubRecord, PostRecord};
use crate::parser::{parse_hubs_page, PostsPage};
use crate::store::RecordStore;

/// Hubs from the cached catalog pages `1..=pages`, in page order.
pub fn list_hubs(cache: &HtmlCache, pages: u32) -> Result<Vec<HubRecord>> {
    let mut hubs = Vec::new();
    for page in 1..=pages {
        let url = hubs_catalog_url(page);
        let html = cache.load(&url)?;
        let parsed = parse_hubs_page(&html)?;
        debug!("{} hubs on {}", parsed.len(), url);
        hubs.extend(parsed);
    }
    info!("Listed {} hubs from {} catalog pages", hubs.len(), pages);
    Ok(hubs)
}

/// Parse the cached pages of `urls` one at a time, yielding their posts.
///
/// Pages are streamed, records within a page are not: the parsed document is
/// borrowed by its element iterator, so each page's records are collected
/// before the document is dropped. Memory is bounded by one page.
pub fn load_raw_posts<'a, I, S>(
    cache: &'a HtmlCache,
    urls: I,
    current_year: i32,
) -> impl Iterator<Item = Result<PostRecord>> + 'a
where
    I: IntoIterator<Item = S> + 'a,
    I::IntoIter: 'a,
    S: AsRef<str> + 'a,
{
    urls.into_iter().flat_map(move |url| {
        let url = url.as_ref();
        let page: Vec<Result<PostRecord>> = match cache.load(url) {
            Ok(html) => PostsPage::parse(&html, current_year)
                .posts()
                .map(|post| post.map_err(|e| page_error(url, e)))
                .collect(),
            Err(e) => vec![Err(e)],
        };
        page
    })
}

fn page_error(url: &str, error: ScrapeError) -> ScrapeError {
    match error {
        ScrapeError::Parse(message) => ScrapeError::Parse(format!("{}: {}", url, message)),
        other => other,
    }
}

/// Parse every cached hub page, drop duplicate posts and write the table.
/// The first page that fails to load or parse aborts the run and leaves the
/// previous table in place.
pub fn build_posts_table<I>(
    cache: &HtmlCache,
    urls: I,
    current_year: i32,
    store: &RecordStore,
) -> Result<usize>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    store.try_save(unique_post_results(load_raw_posts(cache, urls, current_year)))
}
