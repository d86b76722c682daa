use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::hubs::HUB_URL;
use super::{numbers::parse_habr_int, require, text_of};
use crate::error::{Result, ScrapeError};
use crate::models::{PostRecord, Votes};

/// Genitive month names as they appear in post dates, January first.
pub const MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

lazy_static! {
    static ref POST_DATE: Regex =
        Regex::new(r"(\d+)\s+(\p{L}+)(?:\s+(\d{4}))?").expect("POST_DATE regex is valid");
    static ref VOTES_TITLE: Regex =
        Regex::new(r"Общий рейтинг\s+-?\d+:\s*↑([\d.-]+)\s+и\s+↓([\d.-]+)")
            .expect("VOTES_TITLE regex is valid");
    static ref COMPANY_URL: Regex = Regex::new(r"^https?://habrahabr\.ru/company/([^/]+)/$")
        .expect("COMPANY_URL regex is valid");
    static ref POST: Selector = Selector::parse("div.post").expect("post selector is valid");
    static ref MEGAPOST: Selector =
        Selector::parse("div.megapost-cover").expect("megapost selector is valid");
    static ref PUBLISHED: Selector =
        Selector::parse("div.published").expect("published selector is valid");
    static ref TITLE: Selector = Selector::parse("a.post_title").expect("title selector is valid");
    static ref HUBS: Selector = Selector::parse("div.hubs").expect("hubs selector is valid");
    static ref LINK: Selector = Selector::parse("a").expect("link selector is valid");
    static ref INFO: Selector =
        Selector::parse("ul.postinfo-panel").expect("info selector is valid");
    static ref VOTES: Selector = Selector::parse("span.voting-wjt__counter-score")
        .expect("votes selector is valid");
    static ref VIEWS: Selector =
        Selector::parse("div.views-count_post").expect("views selector is valid");
    static ref STARS: Selector =
        Selector::parse("span.favorite-wjt__counter").expect("stars selector is valid");
    static ref AUTHOR: Selector =
        Selector::parse("a.post-author__link").expect("author selector is valid");
    static ref COMMENTS: Selector =
        Selector::parse("a.post-comments__link_all").expect("comments selector is valid");
}

/// A parsed post listing page. Records are produced lazily by [`PostsPage::posts`].
pub struct PostsPage {
    document: Html,
    current_year: i32,
}

impl PostsPage {
    /// `current_year` is used for dates the site prints without a year.
    pub fn parse(html: &str, current_year: i32) -> Self {
        Self {
            document: Html::parse_document(html),
            current_year,
        }
    }

    /// Posts in page order, megapost covers skipped.
    pub fn posts(&self) -> impl Iterator<Item = Result<PostRecord>> + '_ {
        self.document
            .select(&POST)
            .filter(|item| {
                let megapost = item.select(&MEGAPOST).next().is_some();
                if megapost {
                    debug!("Skipping megapost");
                }
                !megapost
            })
            .map(move |item| parse_post(item, self.current_year))
    }
}

pub fn parse_posts(html: &str, current_year: i32) -> Result<Vec<PostRecord>> {
    PostsPage::parse(html, current_year).posts().collect()
}

fn parse_post(item: ElementRef, current_year: i32) -> Result<PostRecord> {
    let published = require(item, &PUBLISHED, "publication date")?;
    let date = parse_post_date(&text_of(published), current_year)?;

    let link = require(item, &TITLE, "post title")?;
    let url = link
        .value()
        .attr("href")
        .ok_or_else(|| ScrapeError::parse("post title has no href"))?
        .to_string();
    let title = text_of(link);

    let (hubs, company) = parse_hubs_block(require(item, &HUBS, "hubs block")?);

    let info = require(item, &INFO, "post info panel")?;
    let votes = match info.select(&VOTES).next() {
        Some(element) => {
            let tooltip = element
                .value()
                .attr("title")
                .ok_or_else(|| ScrapeError::parse(format!("votes of {} have no title", url)))?;
            parse_votes_title(tooltip)?
        }
        None => Votes::default(),
    };
    let views = parse_habr_int(&text_of(require(info, &VIEWS, "views counter")?))?;
    let stars = parse_habr_int(&text_of(require(info, &STARS, "favorites counter")?))?;

    // rss bots have no author link
    let user = info.select(&AUTHOR).next().map(text_of);

    let comments = match info.select(&COMMENTS).next() {
        Some(element) => {
            let text = text_of(element);
            text.parse::<u64>()
                .map_err(|_| ScrapeError::parse(format!("unexpected comment count {:?}", text)))?
        }
        None => 0,
    };

    Ok(PostRecord {
        url,
        title,
        date,
        hubs,
        company,
        votes,
        views,
        stars,
        user,
        comments,
    })
}

/// Parse `"<day> <month> [<year>]"` out of a free-text date line.
/// Text without such a date (e.g. "сегодня в 12:00") yields `None`.
pub fn parse_post_date(value: &str, current_year: i32) -> Result<Option<NaiveDate>> {
    let Some(caps) = POST_DATE.captures(value) else {
        return Ok(None);
    };

    let day: u32 = caps[1]
        .parse()
        .map_err(|_| ScrapeError::parse(format!("bad day in {:?}", value)))?;
    let month = MONTHS
        .iter()
        .position(|name| *name == &caps[2])
        .ok_or_else(|| ScrapeError::parse(format!("unknown month {:?}", &caps[2])))?
        as u32
        + 1;
    let year = match caps.get(3) {
        Some(year) => year
            .as_str()
            .parse()
            .map_err(|_| ScrapeError::parse(format!("bad year in {:?}", value)))?,
        None => current_year,
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| ScrapeError::parse(format!("invalid date {:?}", value)))
}

/// Parse the rating tooltip, e.g. `"Общий рейтинг 20: ↑15 и ↓5"`.
/// Up and down sometimes come as decimals and are truncated.
pub fn parse_votes_title(title: &str) -> Result<Votes> {
    let caps = VOTES_TITLE
        .captures(title)
        .ok_or_else(|| ScrapeError::parse(format!("unexpected votes tooltip {:?}", title)))?;
    let up = parse_vote_count(&caps[1])?;
    let down = parse_vote_count(&caps[2])?;
    Ok(Votes::new(up, down))
}

fn parse_vote_count(value: &str) -> Result<i64> {
    value
        .parse::<f64>()
        .map(|count| count.trunc() as i64)
        .map_err(|_| ScrapeError::parse(format!("bad vote count {:?}", value)))
}

/// Hub ids in order plus the company blog, if any. When a post belongs to
/// several companies the last one wins.
fn parse_hubs_block(block: ElementRef) -> (Vec<String>, Option<String>) {
    let mut hubs = Vec::new();
    let mut company = None;

    for link in block.select(&LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(caps) = HUB_URL.captures(href) {
            hubs.push(caps[1].to_string());
        } else if let Some(caps) = COMPANY_URL.captures(href) {
            company = Some(caps[1].to_string());
        } else {
            debug!("Ignoring link {} in hubs block", href);
        }
    }

    (hubs, company)
}
