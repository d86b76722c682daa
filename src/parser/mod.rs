pub mod hubs;
pub mod numbers;
pub mod posts;

pub use hubs::parse_hubs_page;
pub use numbers::parse_habr_int;
pub use posts::{parse_post_date, parse_posts, parse_votes_title, PostsPage, MONTHS};

use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapeError};

pub(crate) fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub(crate) fn require<'a>(
    parent: ElementRef<'a>,
    selector: &Selector,
    what: &str,
) -> Result<ElementRef<'a>> {
    parent
        .select(selector)
        .next()
        .ok_or_else(|| ScrapeError::parse(format!("missing {}", what)))
}
