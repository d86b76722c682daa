use std::collections::HashSet;

use crate::error::Result;
use crate::models::PostRecord;

/// URLs already emitted.
#[derive(Debug, Default)]
pub struct SeenUrls {
    urls: HashSet<String>,
}

impl SeenUrls {
    /// `true` the first time `url` is offered.
    pub fn first_time(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }
}

/// Iterator adapter yielding only the first post seen for each URL.
/// Memory is bounded by the number of distinct URLs, not the input.
pub struct UniquePosts<I> {
    posts: I,
    seen: SeenUrls,
}

impl<I> Iterator for UniquePosts<I>
where
    I: Iterator<Item = PostRecord>,
{
    type Item = PostRecord;

    fn next(&mut self) -> Option<PostRecord> {
        for post in self.posts.by_ref() {
            if self.seen.first_time(&post.url) {
                return Some(post);
            }
        }
        None
    }
}

pub fn unique_posts<I>(posts: I) -> UniquePosts<I::IntoIter>
where
    I: IntoIterator<Item = PostRecord>,
{
    UniquePosts {
        posts: posts.into_iter(),
        seen: SeenUrls::default(),
    }
}

/// [`unique_posts`] over fallible input. Errors pass through untouched so the
/// consumer sees them in order.
pub fn unique_post_results<I>(posts: I) -> impl Iterator<Item = Result<PostRecord>>
where
    I: IntoIterator<Item = Result<PostRecord>>,
{
    let mut seen = SeenUrls::default();
    posts.into_iter().filter(move |post| match post {
        Ok(post) => seen.first_time(&post.url),
        Err(_) => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::models::Votes;

    fn post(url: &str, title: &str) -> PostRecord {
        PostRecord {
            url: url.to_string(),
            title: title.to_string(),
            date: None,
            hubs: Vec::new(),
            company: None,
            votes: Votes::default(),
            views: 0,
            stars: 0,
            user: None,
            comments: 0,
        }
    }

    fn sample() -> Vec<PostRecord> {
        vec![
            post("a", "first a"),
            post("b", "first b"),
            post("a", "second a"),
            post("c", "first c"),
            post("b", "second b"),
        ]
    }

    #[test]
    fn test_keeps_first_occurrence_in_order() {
        let titles: Vec<String> = unique_posts(sample()).map(|p| p.title).collect();
        assert_eq!(titles, vec!["first a", "first b", "first c"]);
    }

    #[test]
    fn test_idempotent() {
        let once: Vec<PostRecord> = unique_posts(sample()).collect();
        let twice: Vec<PostRecord> = unique_posts(once.clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_results_keep_errors_and_drop_repeats() {
        let input = vec![
            Ok(post("a", "first a")),
            Ok(post("a", "second a")),
            Err(ScrapeError::Parse("broken page".to_string())),
            Ok(post("b", "first b")),
        ];
        let output: Vec<Result<PostRecord>> = unique_post_results(input).collect();

        assert_eq!(output.len(), 3);
        assert_eq!(output[0].as_ref().unwrap().title, "first a");
        assert!(matches!(output[1], Err(ScrapeError::Parse(_))));
        assert_eq!(output[2].as_ref().unwrap().title, "first b");
    }

    #[test]
    fn test_streams_without_draining_input() {
        let mut consumed = 0;
        let source = sample().into_iter().inspect(|_| consumed += 1);
        let first = unique_posts(source).next();
        assert_eq!(first.map(|p| p.url), Some("a".to_string()));
        assert_eq!(consumed, 1);
    }
}
