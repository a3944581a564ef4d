use crate::provider::{FetchError, PlaylistPage};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistClient: Send + Sync {
    /// Fetch a single page of playlist items from remote
    async fn fetch(
        &self,
        playlist_id: &str,
        max_results: u32,
        api_key: &str,
    ) -> Result<PlaylistPage, FetchError>;
}
