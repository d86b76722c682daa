pub mod cache;
pub mod config;
pub mod dedup;
pub mod error;
pub mod habr_client;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod store;

pub use cache::HtmlCache;
pub use config::ScrapeConfig;
pub use dedup::{unique_post_results, unique_posts, SeenUrls, UniquePosts};
pub use error::{Result, ScrapeError};
pub use habr_client::{FetchStats, HabrClient};
pub use models::{HubRecord, PostRecord, Votes};
pub use parser::PostsPage;
pub use store::RecordStore;
