pub mod traits;
pub mod json_file;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

pub use traits::WatchListStore;
pub use json_file::JsonFileStore;
pub use sqlite::{SqliteStorage, SqliteWatchListStore};

use crate::errors::FeedbotResult;

const SQLITE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

fn is_sqlite_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SQLITE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Open the store backend matching the file extension (SQLite for `.db`,
/// `.sqlite`, `.sqlite3`; JSON otherwise).
pub fn open<P: AsRef<Path>>(path: P) -> FeedbotResult<Arc<dyn WatchListStore>> {
    let path = path.as_ref();
    if is_sqlite_path(path) {
        let storage = SqliteStorage::new(path)?;
        Ok(Arc::new(SqliteWatchListStore::new(storage)))
    } else {
        Ok(Arc::new(JsonFileStore::new(path)))
    }
}
