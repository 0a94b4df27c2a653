use crate::domain::WatchList;
use crate::errors::FeedbotResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::WatchListStore;

pub struct SqliteWatchListStore {
    storage: SqliteStorage,
}

impl SqliteWatchListStore {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl WatchListStore for SqliteWatchListStore {
    fn load(&self) -> FeedbotResult<WatchList> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT name, url FROM sources ORDER BY name")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut list = WatchList::new();
        for row in rows {
            let (name, url) = row?;
            list.insert(name, url);
        }

        Ok(list)
    }

    fn save(&self, watch_list: &WatchList) -> FeedbotResult<()> {
        let mut conn = self.storage.connection()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM sources", [])?;
        {
            let mut insert = tx.prepare("INSERT INTO sources (name, url) VALUES (?1, ?2)")?;
            for source in watch_list.sources() {
                insert.execute((&source.name, &source.url))?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}
