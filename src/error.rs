use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Page {url} is not cached (expected at {path})")]
    NotCached { url: String, path: PathBuf },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        ScrapeError::Parse(message.into())
    }
}
