use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::domain::Entry;
use crate::errors::{FeedbotError, FeedbotResult};
use crate::sources::traits::FeedSource;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOTAL_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 5;

/// Feeds larger than this are rejected rather than parsed.
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

const USER_AGENT: &str = concat!("feedbot/", env!("CARGO_PKG_VERSION"));

/// RSS, Atom and JSON Feed documents fetched over HTTP.
pub struct RssAtomSource {
    client: Client,
}

impl RssAtomSource {
    pub fn new() -> FeedbotResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_bytes(&self, url: &str) -> FeedbotResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedbotError::Fetch(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(FeedbotError::Fetch(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_FEED_SIZE {
                return Err(FeedbotError::Fetch(format!(
                    "{}: feed too large ({} bytes)",
                    url, length
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedbotError::Fetch(format!("{}: {}", url, e)))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(FeedbotError::Fetch(format!(
                "{}: feed too large ({} bytes)",
                url,
                bytes.len()
            )));
        }

        Ok(bytes.to_vec())
    }

    /// Parse raw feed bytes into entries, keeping the document's order.
    pub fn entries_from_bytes(bytes: &[u8]) -> FeedbotResult<Vec<Entry>> {
        let parsed = parser::parse(bytes).map_err(|e| FeedbotError::Fetch(e.to_string()))?;

        let entries = parsed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string());

                // The link identifies the entry; fall back to the id when a feed has none
                let link = entry
                    .links
                    .into_iter()
                    .map(|l| l.href)
                    .find(|href| !href.is_empty())
                    .or_else(|| Some(entry.id).filter(|id| !id.is_empty()))?;

                let published = entry.published.or(entry.updated);

                Some(Entry::new(title, link).with_published(published))
            })
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl FeedSource for RssAtomSource {
    async fn fetch(&self, url: &str) -> FeedbotResult<Vec<Entry>> {
        let bytes = self.fetch_bytes(url).await?;
        let entries = Self::entries_from_bytes(&bytes)
            .map_err(|e| FeedbotError::Fetch(format!("{}: {}", url, e)))?;

        debug!("Fetched {} entries from {}", entries.len(), url);
        Ok(entries)
    }
}
