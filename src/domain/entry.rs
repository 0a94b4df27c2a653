use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item produced by fetching a source. Lives for a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    /// Identifies the entry for deduplication.
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published: None,
        }
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }
}
