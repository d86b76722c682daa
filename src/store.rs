use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::models::{PostRecord, Votes};

pub const HEADER: [&str; 11] = [
    "url", "title", "date", "hubs", "company", "up", "down", "views", "stars", "user", "comments",
];
pub const HUBS_DELIMITER: &str = ", ";

/// One CSV row. Empty optional fields read back as `None`, so `Some("")`
/// does not survive a round trip.
#[derive(Debug, Serialize, Deserialize)]
struct PostRow {
    url: String,
    title: String,
    date: Option<NaiveDate>,
    hubs: String,
    company: Option<String>,
    up: i64,
    down: i64,
    views: u64,
    stars: u64,
    user: Option<String>,
    comments: u64,
}

impl From<PostRecord> for PostRow {
    fn from(post: PostRecord) -> Self {
        Self {
            url: post.url,
            title: post.title,
            date: post.date,
            hubs: post.hubs.join(HUBS_DELIMITER),
            company: post.company,
            up: post.votes.up,
            down: post.votes.down,
            views: post.views,
            stars: post.stars,
            user: post.user,
            comments: post.comments,
        }
    }
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        let hubs = if row.hubs.is_empty() {
            Vec::new()
        } else {
            row.hubs.split(HUBS_DELIMITER).map(str::to_string).collect()
        };

        Self {
            url: row.url,
            title: row.title,
            date: row.date,
            hubs,
            company: row.company,
            votes: Votes::new(row.up, row.down),
            views: row.views,
            stars: row.stars,
            user: row.user,
            comments: row.comments,
        }
    }
}

/// Flat CSV table of parsed posts.
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the table with `posts`. Returns the number of rows written.
    pub fn save<I>(&self, posts: I) -> Result<usize>
    where
        I: IntoIterator<Item = PostRecord>,
    {
        self.try_save(posts.into_iter().map(Ok))
    }

    /// Like [`RecordStore::save`], but the first `Err` aborts the write.
    /// Rows go to a sibling `.tmp` file that replaces the table only once
    /// every record was written, so a failed run keeps the previous table.
    pub fn try_save<I>(&self, posts: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<PostRecord>>,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        match write_table(&temp, posts) {
            Ok(count) => {
                fs::rename(&temp, &self.path)?;
                info!("Saved {} posts to {}", count, self.path.display());
                Ok(count)
            }
            Err(e) => {
                let _ = fs::remove_file(&temp);
                Err(e)
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Stream the table back in file order.
    pub fn load_all(&self) -> Result<impl Iterator<Item = Result<PostRecord>>> {
        let reader = csv::Reader::from_path(&self.path)?;
        Ok(reader
            .into_deserialize::<PostRow>()
            .map(|row| row.map(PostRecord::from).map_err(ScrapeError::from)))
    }
}

fn write_table<I>(path: &Path, posts: I) -> Result<usize>
where
    I: IntoIterator<Item = Result<PostRecord>>,
{
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(HEADER)?;

    let mut count = 0;
    for post in posts {
        writer.serialize(PostRow::from(post?))?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn post(url: &str) -> PostRecord {
        PostRecord {
            url: url.to_string(),
            title: "Заголовок, с запятой и \"кавычками\"".to_string(),
            date: NaiveDate::from_ymd_opt(2015, 11, 2),
            hubs: vec!["python".to_string(), "algorithms".to_string()],
            company: Some("yandex".to_string()),
            votes: Votes::new(15, 5),
            views: 12300,
            stars: 42,
            user: Some("alice".to_string()),
            comments: 17,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("posts.csv"));

        let mut bare = post("https://habrahabr.ru/post/2/");
        bare.date = None;
        bare.company = None;
        bare.user = None;
        bare.hubs = Vec::new();
        bare.votes = Votes::default();
        let posts = vec![post("https://habrahabr.ru/post/1/"), bare];

        assert_eq!(store.save(posts.clone()).unwrap(), 2);
        let loaded: Vec<PostRecord> = store.load_all().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(loaded, posts);
    }

    #[test]
    fn test_header_and_row_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("posts.csv"));
        let mut record = post("https://habrahabr.ru/post/1/");
        record.title = "Plain".to_string();
        store.save(vec![record]).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "url,title,date,hubs,company,up,down,views,stars,user,comments",
                "https://habrahabr.ru/post/1/,Plain,2015-11-02,\"python, algorithms\",yandex,15,5,12300,42,alice,17",
            ]
        );
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("nested").join("posts.csv"));

        store
            .save(vec![post("https://habrahabr.ru/post/1/"), post("https://habrahabr.ru/post/2/")])
            .unwrap();
        store.save(Vec::new()).unwrap();

        assert_eq!(store.load_all().unwrap().count(), 0);
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.trim_end(), HEADER.join(","));
    }

    #[test]
    fn test_failed_save_keeps_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("posts.csv"));
        store
            .save(vec![post("https://habrahabr.ru/post/1/"), post("https://habrahabr.ru/post/2/")])
            .unwrap();

        let rows = vec![
            Ok(post("https://habrahabr.ru/post/3/")),
            Err(ScrapeError::Parse("missing post title".to_string())),
            Ok(post("https://habrahabr.ru/post/4/")),
        ];
        assert!(matches!(store.try_save(rows), Err(ScrapeError::Parse(_))));

        let urls: Vec<String> = store
            .load_all()
            .unwrap()
            .map(|post| post.unwrap().url)
            .collect();
        assert_eq!(
            urls,
            vec!["https://habrahabr.ru/post/1/", "https://habrahabr.ru/post/2/"]
        );
        assert!(!dir.path().join("posts.csv.tmp").exists());
    }

    #[test]
    fn test_empty_optional_collapses_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("posts.csv"));
        let mut record = post("https://habrahabr.ru/post/1/");
        record.company = Some(String::new());
        store.save(vec![record]).unwrap();

        let loaded = store.load_all().unwrap().next().unwrap().unwrap();
        assert_eq!(loaded.company, None);
    }

    #[test]
    fn test_malformed_rows_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        fs::write(
            &path,
            "url,title,date,hubs,company,up,down,views,stars,user,comments\n\
             https://habrahabr.ru/post/1/,T,2015-13-45,python,,1,0,10,0,bob,0\n\
             https://habrahabr.ru/post/2/,T\n",
        )
        .unwrap();

        let results: Vec<Result<PostRecord>> = RecordStore::new(&path).load_all().unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(ScrapeError::Csv(_))));
        assert!(matches!(results[1], Err(ScrapeError::Csv(_))));
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RecordStore::new(dir.path().join("absent.csv")).load_all().is_err());
    }
}
