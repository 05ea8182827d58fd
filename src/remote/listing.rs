use crate::core::post::Post;

use super::posts::{paginate, search, total_pages, FetchError};

/// Where the most recent fetch stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// View state for the posts page: the fetched posts, the search box and the pager.
///
/// A new listing starts in `Loading` because opening the view kicks off the
/// fetch. Filtered and paged views are recomputed from the posts on every call.
#[derive(Debug, Clone)]
pub struct PostListing {
    posts: Vec<Post>,
    status: FetchStatus,
    search: String,
    page: usize,
    page_size: usize,
}

impl PostListing {
    pub fn new(page_size: usize) -> Self {
        Self {
            posts: Vec::new(),
            status: FetchStatus::Loading,
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn begin_fetch(&mut self) {
        self.status = FetchStatus::Loading;
    }

    /// Apply a completed fetch. Whichever fetch finishes last wins.
    pub fn finish_fetch(&mut self, result: Result<Vec<Post>, FetchError>) {
        match result {
            Ok(posts) => {
                self.posts = posts;
                self.status = FetchStatus::Ready;
            }
            Err(e) => {
                log::warn!("Post fetch failed: {}", e);
                self.status = FetchStatus::Failed(e.to_string());
            }
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Change the search text. Always returns to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn filtered(&self) -> Vec<Post> {
        search(&self.posts, &self.search)
    }

    pub fn filtered_len(&self) -> usize {
        if self.search.is_empty() {
            return self.posts.len();
        }
        let needle = self.search.to_lowercase();
        self.posts
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .count()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_len(), self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Jump to `page`. Returns false and stays put if there is no such page.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    /// Posts on the current page of the filtered list.
    pub fn visible(&self) -> Vec<Post> {
        paginate(&self.filtered(), self.page, self.page_size).to_vec()
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} posts",
            self.visible().len(),
            self.filtered_len()
        )
    }
}
