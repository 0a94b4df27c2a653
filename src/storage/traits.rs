use crate::domain::WatchList;
use crate::errors::FeedbotResult;

/// Durable home of the watch list.
#[cfg_attr(test, mockall::automock)]
pub trait WatchListStore: Send + Sync {
    /// Current persisted list; an absent store yields an empty list.
    fn load(&self) -> FeedbotResult<WatchList>;

    /// Replace the persisted list. Must never leave a half-written store behind.
    fn save(&self, watch_list: &WatchList) -> FeedbotResult<()>;
}
