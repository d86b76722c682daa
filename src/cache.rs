use sha1::{Digest, Sha1};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ScrapeError};

const INDEX_FILE: &str = "list.txt";
const PAGE_EXTENSION: &str = "html";

pub fn hash_url(url: &str) -> String {
    format!("{:x}", Sha1::digest(url.as_bytes()))
}

/// On-disk store of raw HTML pages keyed by the SHA-1 of their URL.
///
/// Every `store` appends a `hash\turl` line to `list.txt`, so a URL fetched
/// twice appears twice in the index while its page file is overwritten.
#[derive(Debug, Clone)]
pub struct HtmlCache {
    root: PathBuf,
}

impl HtmlCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(format!("{}.{}", hash_url(url), PAGE_EXTENSION))
    }

    pub fn store(&self, url: &str, html: Option<&str>) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let path = self.path_for(url);
        fs::write(&path, html.unwrap_or(""))?;

        let mut index = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path())?;
        writeln!(index, "{}\t{}", hash_url(url), url)?;

        debug!("Cached {} as {}", url, path.display());
        Ok(())
    }

    pub fn load(&self, url: &str) -> Result<String> {
        let path = self.path_for(url);
        match fs::read_to_string(&path) {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ScrapeError::NotCached {
                url: url.to_string(),
                path,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// URLs from the index in file order, duplicates included.
    /// A cache that has never been written to yields nothing.
    pub fn list_cached_urls(&self) -> Result<CachedUrls> {
        let lines = match File::open(self.index_path()) {
            Ok(file) => Some(BufReader::new(file).lines()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(CachedUrls { lines })
    }

    pub fn cached_urls(&self) -> Result<HashSet<String>> {
        self.list_cached_urls()?.collect()
    }
}

pub struct CachedUrls {
    lines: Option<io::Lines<BufReader<File>>>,
}

impl Iterator for CachedUrls {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        loop {
            let line = match lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.is_empty() {
                continue;
            }
            return Some(match line.split_once('\t') {
                Some((_, url)) => Ok(url.to_string()),
                None => Err(ScrapeError::parse(format!(
                    "malformed cache index line: {:?}",
                    line
                ))),
            });
        }
    }
}
