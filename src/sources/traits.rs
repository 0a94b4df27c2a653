use async_trait::async_trait;

use crate::domain::Entry;
use crate::errors::FeedbotResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`, newest entry first.
    /// Network and parse failures are `FeedbotError::Fetch`.
    async fn fetch(&self, url: &str) -> FeedbotResult<Vec<Entry>>;
}
