use reqwest::{Client, StatusCode};

use crate::core::post::Post;

pub const DEFAULT_POSTS_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const POSTS_PER_PAGE: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to fetch posts (HTTP {0})")]
    Status(StatusCode),

    #[error("Failed to fetch posts: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to read posts: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the read-only post listing endpoint.
pub struct PostsClient {
    url: String,
    http: Client,
}

impl PostsClient {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let http = Client::builder().build().map_err(FetchError::Request)?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }

    /// One GET, no retries. Any non-2xx status is a failure.
    pub async fn fetch_all(&self) -> Result<Vec<Post>, FetchError> {
        log::debug!("Fetching posts from {}", self.url);
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let posts: Vec<Post> = resp.json().await.map_err(FetchError::Decode)?;
        log::debug!("Fetched {} posts", posts.len());
        Ok(posts)
    }
}

/// Posts whose title or body contains `term`, ignoring case. An empty term matches everything.
pub fn search(posts: &[Post], term: &str) -> Vec<Post> {
    if term.is_empty() {
        return posts.to_vec();
    }
    let needle = term.to_lowercase();
    posts
        .iter()
        .filter(|p| p.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// The 1-based `page` of `items`. Pages past the end (or page 0) are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}
