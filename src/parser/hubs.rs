use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{numbers::parse_habr_int, require, text_of};
use crate::error::{Result, ScrapeError};
use crate::models::HubRecord;

lazy_static! {
    pub(crate) static ref HUB_URL: Regex =
        Regex::new(r"^https?://habrahabr\.ru/hub/([^/]+)/$").expect("HUB_URL regex is valid");
    static ref SUBSCRIBERS: Regex =
        Regex::new(r"^(.+) подписчик(?:|а|ов)$").expect("SUBSCRIBERS regex is valid");
    static ref PUBLICATIONS: Regex =
        Regex::new(r"^(.+) публикаци(?:я|и|й)$").expect("PUBLICATIONS regex is valid");
    static ref HUB: Selector = Selector::parse("div.hub").expect("hub selector is valid");
    static ref TITLE_LINK: Selector =
        Selector::parse("div.title a").expect("title selector is valid");
    static ref STAT: Selector = Selector::parse("div.stat").expect("stat selector is valid");
    static ref LINK: Selector = Selector::parse("a").expect("link selector is valid");
}

/// Parse one page of the hub catalog. An entry whose link is not a hub URL
/// fails the whole page.
pub fn parse_hubs_page(html: &str) -> Result<Vec<HubRecord>> {
    let document = Html::parse_document(html);
    let hubs = document.select(&HUB).map(parse_hub).collect();
    hubs
}

fn parse_hub(item: ElementRef) -> Result<HubRecord> {
    let link = require(item, &TITLE_LINK, "hub title link")?;
    let name = text_of(link);
    let href = link.value().attr("href").unwrap_or_default();
    let id = HUB_URL
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScrapeError::parse(format!("hub {:?} links to {:?}", name, href)))?;

    let stats = require(item, &STAT, "hub stats")?;
    let counters: Vec<String> = stats.select(&LINK).map(text_of).collect();
    let [subscribers, posts] = counters.as_slice() else {
        return Err(ScrapeError::parse(format!(
            "hub {} has {} stat links, expected 2",
            id,
            counters.len()
        )));
    };

    Ok(HubRecord {
        subscribers: parse_stat(&SUBSCRIBERS, subscribers)?,
        posts: parse_stat(&PUBLICATIONS, posts)?,
        id,
        name,
    })
}

fn parse_stat(pattern: &Regex, text: &str) -> Result<u64> {
    let caps = pattern
        .captures(text)
        .ok_or_else(|| ScrapeError::parse(format!("unexpected hub stat {:?}", text)))?;
    parse_habr_int(&caps[1])
}
