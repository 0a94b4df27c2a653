use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::{FeedbotError, FeedbotResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sources (
    name TEXT PRIMARY KEY NOT NULL,
    url TEXT NOT NULL
);
"#;

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> FeedbotResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        // A file that is not a database only fails once it is actually read
        conn.execute_batch(SCHEMA).map_err(|e| {
            FeedbotError::Store(format!("{} is not a usable database: {}", path.display(), e))
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> FeedbotResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> FeedbotResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FeedbotError::Store("database connection lock poisoned".to_string()))
    }
}
