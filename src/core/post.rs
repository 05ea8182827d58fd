use serde::{Deserialize, Serialize};

/// A blog post from the remote listing. Read-only; never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

impl Post {
    /// Case-insensitive substring match on title or body. `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.body.to_lowercase().contains(needle)
    }

    pub fn byline(&self) -> String {
        format!("Post #{} by User {}", self.id, self.user_id)
    }
}
