mod connection;
mod watch_list_store;

pub use connection::SqliteStorage;
pub use watch_list_store::SqliteWatchListStore;
