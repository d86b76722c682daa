use chrono::{Datelike, Local};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.3; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/37.0.2049.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CATALOG_PAGES: u32 = 7;
pub const DEFAULT_HUB_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub data_dir: PathBuf,
    /// Year assumed for posts whose listing date omits it.
    pub current_year: i32,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub catalog_pages: u32,
    pub hub_page_size: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            current_year: Local::now().year(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            catalog_pages: DEFAULT_CATALOG_PAGES,
            hub_page_size: DEFAULT_HUB_PAGE_SIZE,
        }
    }
}

impl ScrapeConfig {
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("html")
    }

    pub fn posts_path(&self) -> PathBuf {
        self.data_dir.join("posts.csv")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ScrapeError::Config(
                "timeout must be greater than 0".to_string(),
            ));
        }
        if self.catalog_pages == 0 {
            return Err(ScrapeError::Config(
                "catalog_pages must be greater than 0".to_string(),
            ));
        }
        if self.hub_page_size == 0 {
            return Err(ScrapeError::Config(
                "hub_page_size must be greater than 0".to_string(),
            ));
        }
        if !(1970..=9999).contains(&self.current_year) {
            return Err(ScrapeError::Config(format!(
                "current_year {} is out of range",
                self.current_year
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScrapeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_dir(), PathBuf::from("data").join("html"));
        assert_eq!(config.posts_path(), PathBuf::from("data").join("posts.csv"));
    }

    #[test]
    fn test_current_year_follows_clock() {
        assert_eq!(ScrapeConfig::default().current_year, Local::now().year());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = ScrapeConfig {
            hub_page_size: 0,
            ..ScrapeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScrapeError::Config(_))));

        let config = ScrapeConfig {
            timeout_secs: 0,
            ..ScrapeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ScrapeConfig {
            current_year: 20,
            ..ScrapeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
