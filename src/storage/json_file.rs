use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::WatchList;
use crate::errors::{FeedbotError, FeedbotResult};
use crate::storage::traits::WatchListStore;

/// Watch list kept as a pretty-printed JSON object `{ "name": "url" }`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl WatchListStore for JsonFileStore {
    fn load(&self) -> FeedbotResult<WatchList> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No watch list at {}, starting empty", self.path.display());
                return Ok(WatchList::new());
            }
            Err(e) => {
                return Err(FeedbotError::Store(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            FeedbotError::Store(format!("{} is not a valid watch list: {}", self.path.display(), e))
        })
    }

    fn save(&self, watch_list: &WatchList) -> FeedbotResult<()> {
        let json = serde_json::to_string_pretty(watch_list)
            .map_err(|e| FeedbotError::Store(e.to_string()))?;

        // Temp file in the same directory so the rename stays on one filesystem
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| FeedbotError::Store(format!("cannot replace {}: {}", self.path.display(), e)))?;

        debug!("Saved {} source(s) to {}", watch_list.len(), self.path.display());
        Ok(())
    }
}
