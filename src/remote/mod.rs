pub mod listing;
pub mod posts;

pub use listing::{FetchStatus, PostListing};
pub use posts::{FetchError, PostsClient};
