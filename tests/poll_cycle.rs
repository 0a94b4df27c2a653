//! End-to-end poll cycles through the public API, with in-process
//! doubles standing in for the feed servers and the chat.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use feedbot::domain::{Entry, Notification};
use feedbot::errors::{FeedbotError, FeedbotResult};
use feedbot::services::{AdminService, FeedPoller, Notifier, SeenRegistry};
use feedbot::sources::FeedSource;
use feedbot::storage::{JsonFileStore, WatchListStore};

#[derive(Default)]
struct FakeFeeds(Mutex<HashMap<String, Option<Vec<Entry>>>>);

impl FakeFeeds {
    fn publish(&self, url: &str, entries: Vec<Entry>) {
        self.0.lock().unwrap().insert(url.to_string(), Some(entries));
    }

    fn take_down(&self, url: &str) {
        self.0.lock().unwrap().insert(url.to_string(), None);
    }
}

#[async_trait]
impl FeedSource for FakeFeeds {
    async fn fetch(&self, url: &str) -> FeedbotResult<Vec<Entry>> {
        match self.0.lock().unwrap().get(url) {
            Some(Some(entries)) => Ok(entries.clone()),
            _ => Err(FeedbotError::Fetch(format!("{}: connection refused", url))),
        }
    }
}

#[derive(Default)]
struct FakeChat(Mutex<Vec<String>>);

impl FakeChat {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeChat {
    async fn send(&self, notification: &Notification) -> FeedbotResult<()> {
        self.0.lock().unwrap().push(notification.format());
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    store: Arc<dyn WatchListStore>,
    admin: AdminService,
    feeds: Arc<FakeFeeds>,
    chat: Arc<FakeChat>,
    poller: FeedPoller,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn WatchListStore> =
        Arc::new(JsonFileStore::new(dir.path().join("sources.json")));
    let seen = Arc::new(SeenRegistry::new());
    let feeds = Arc::new(FakeFeeds::default());
    let chat = Arc::new(FakeChat::default());

    Harness {
        admin: AdminService::new(store.clone(), seen.clone()),
        poller: FeedPoller::new(feeds.clone(), chat.clone(), seen),
        _dir: dir,
        store,
        feeds,
        chat,
    }
}

fn item(n: usize) -> Entry {
    Entry::new(format!("Release {}", n), format!("https://tracker.example/view/{}", n))
}

#[tokio::test]
async fn delivers_new_items_once_in_chronological_order() {
    let h = harness();
    h.admin.add_source("tracker", "https://tracker.example/rss").unwrap();
    h.feeds.publish(
        "https://tracker.example/rss",
        vec![item(5), item(4), item(3), item(2), item(1)],
    );

    let first = h.poller.poll(h.store.clone()).await.unwrap();
    let second = h.poller.poll(h.store.clone()).await.unwrap();

    assert_eq!(first.delivered(), 5);
    assert_eq!(second.delivered(), 0);
    let expected: Vec<String> = (1..=5)
        .map(|n| format!("🔹 <b>Release {}</b>\nhttps://tracker.example/view/{}", n, n))
        .collect();
    assert_eq!(h.chat.messages(), expected);
}

#[tokio::test]
async fn failing_source_does_not_block_others() {
    let h = harness();
    h.admin.add_source("a", "https://a.example/rss").unwrap();
    h.admin.add_source("b", "https://b.example/rss").unwrap();
    h.feeds.take_down("https://a.example/rss");
    h.feeds.publish("https://b.example/rss", vec![item(1)]);

    let report = h.poller.poll(h.store.clone()).await.unwrap();

    assert!(report.source("a").unwrap().fetch_failed());
    assert!(!report.source("b").unwrap().fetch_failed());
    assert_eq!(report.delivered(), 1);
    assert_eq!(h.chat.messages().len(), 1);
}

#[tokio::test]
async fn admin_changes_apply_from_next_cycle() {
    let h = harness();
    h.feeds.publish("https://a.example/rss", vec![item(1)]);
    h.feeds.publish("https://b.example/rss", vec![item(2)]);

    h.admin.add_source("a", "https://a.example/rss").unwrap();
    let snapshot = h.store.load().unwrap();
    h.admin.add_source("b", "https://b.example/rss").unwrap();

    // A cycle running on the older snapshot does not see "b"
    let report = h.poller.run_cycle(&snapshot).await;
    assert_eq!(report.sources.len(), 1);

    let report = h.poller.poll(h.store.clone()).await.unwrap();
    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.source("b").unwrap().delivered, 1);
}

#[tokio::test]
async fn removed_and_readded_source_starts_fresh() {
    let h = harness();
    h.feeds.publish("https://a.example/rss", vec![item(1)]);
    h.admin.add_source("a", "https://a.example/rss").unwrap();

    h.poller.poll(h.store.clone()).await.unwrap();
    h.admin.remove_source("a").unwrap();
    h.admin.add_source("a", "https://a.example/rss").unwrap();
    let report = h.poller.poll(h.store.clone()).await.unwrap();

    assert_eq!(report.delivered(), 1);
    assert_eq!(h.chat.messages().len(), 2);
}

#[tokio::test]
async fn empty_watch_list_is_a_quiet_cycle() {
    let h = harness();
    let report = h.poller.poll(h.store.clone()).await.unwrap();

    assert!(report.sources.is_empty());
    assert!(report.is_quiet());
}
