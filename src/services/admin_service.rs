use std::sync::{Arc, Mutex};

use tracing::info;
use url::Url;

use crate::domain::{Source, WatchList};
use crate::errors::{FeedbotError, FeedbotResult};
use crate::services::seen_registry::SeenRegistry;
use crate::storage::traits::WatchListStore;

/// Add, remove and list watched sources.
///
/// Every mutation is a load, modify, save sequence; the write lock keeps
/// concurrent callers from overwriting each other's changes.
pub struct AdminService {
    store: Arc<dyn WatchListStore>,
    seen: Arc<SeenRegistry>,
    write_lock: Mutex<()>,
}

impl AdminService {
    pub fn new(store: Arc<dyn WatchListStore>, seen: Arc<SeenRegistry>) -> Self {
        Self {
            store,
            seen,
            write_lock: Mutex::new(()),
        }
    }

    /// Start watching a new source. Existing names are rejected, not overwritten.
    pub fn add_source(&self, name: &str, url: &str) -> FeedbotResult<Source> {
        let name = validate_name(name)?;
        let url = validate_url(url)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut list = self.store.load()?;

        if let Some(existing) = list.url(name) {
            return Err(FeedbotError::Validation(format!(
                "source `{}` already exists ({}); remove it first",
                name, existing
            )));
        }

        list.insert(name, url);
        self.store.save(&list)?;

        // Anything remembered under this name belongs to an earlier source
        self.seen.forget(name);

        info!("Added source {} -> {}", name, url);
        Ok(Source::new(name, url))
    }

    /// Stop watching a source and forget what was delivered for it.
    pub fn remove_source(&self, name: &str) -> FeedbotResult<Source> {
        let name = name.trim();

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut list = self.store.load()?;

        let url = list
            .remove(name)
            .ok_or_else(|| FeedbotError::NotFound(name.to_string()))?;
        self.store.save(&list)?;

        self.seen.forget(name);

        info!("Removed source {}", name);
        Ok(Source::new(name, url))
    }

    /// Snapshot of the watch list for display.
    pub fn list_sources(&self) -> FeedbotResult<WatchList> {
        self.store.load()
    }
}

fn validate_name(name: &str) -> FeedbotResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FeedbotError::Validation("source name is empty".to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(FeedbotError::Validation(format!(
            "source name `{}` must not contain whitespace",
            name
        )));
    }
    Ok(name)
}

fn validate_url(url: &str) -> FeedbotResult<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(FeedbotError::Validation("source URL is empty".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|e| FeedbotError::Validation(format!("invalid URL `{}`: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FeedbotError::Validation(format!(
            "unsupported URL scheme `{}`",
            scheme
        ))),
    }
}
