use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{Notification, Source, WatchList};
use crate::errors::{FeedbotError, FeedbotResult};
use crate::services::notification_service::Notifier;
use crate::services::seen_registry::SeenRegistry;
use crate::sources::FeedSource;
use crate::storage::WatchListStore;

/// Only the newest entries of each fetch are considered.
pub const ENTRIES_PER_CYCLE: usize = 5;

/// Outcome of polling one source during a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub delivered: usize,
    pub failed: usize,
    pub fetch_error: Option<String>,
    /// Link of the entry whose delivery failed, with the reason
    pub delivery_error: Option<(String, String)>,
}

impl SourceReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn fetch_failed(&self) -> bool {
        self.fetch_error.is_some()
    }
}

/// Per-source results of one cycle, in polling order. Observability only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
}

impl CycleReport {
    pub fn delivered(&self) -> usize {
        self.sources.iter().map(|s| s.delivered).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().map(|s| s.failed).sum()
    }

    pub fn fetch_failures(&self) -> usize {
        self.sources.iter().filter(|s| s.fetch_failed()).count()
    }

    pub fn source(&self, name: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Nothing delivered and nothing went wrong
    pub fn is_quiet(&self) -> bool {
        self.delivered() == 0 && self.failed() == 0 && self.fetch_failures() == 0
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} source(s): {} delivered, {} delivery failure(s), {} fetch failure(s)",
            self.sources.len(),
            self.delivered(),
            self.failed(),
            self.fetch_failures()
        )
    }
}

/// Runs poll cycles: fetch each watched source, deliver what has not been
/// seen, remember what was delivered.
pub struct FeedPoller {
    source: Arc<dyn FeedSource>,
    notifier: Arc<dyn Notifier>,
    seen: Arc<SeenRegistry>,
    entries_per_cycle: usize,
}

impl FeedPoller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        notifier: Arc<dyn Notifier>,
        seen: Arc<SeenRegistry>,
    ) -> Self {
        Self {
            source,
            notifier,
            seen,
            entries_per_cycle: ENTRIES_PER_CYCLE,
        }
    }

    pub fn with_entries_per_cycle(mut self, entries_per_cycle: usize) -> Self {
        self.entries_per_cycle = entries_per_cycle;
        self
    }

    pub fn seen(&self) -> &Arc<SeenRegistry> {
        &self.seen
    }

    /// Load a fresh snapshot of the watch list and run one cycle over it.
    pub async fn poll(&self, store: Arc<dyn WatchListStore>) -> FeedbotResult<CycleReport> {
        let watch_list = match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(loaded) => loaded?,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                return Err(FeedbotError::Store(format!("watch list load cancelled: {}", e)));
            }
        };
        Ok(self.run_cycle(&watch_list).await)
    }

    /// One pass over every source in `watch_list`, in name order.
    ///
    /// Failures stay local: a fetch failure skips its source, a delivery
    /// failure stops that source for this cycle. Neither affects other sources.
    pub async fn run_cycle(&self, watch_list: &WatchList) -> CycleReport {
        let dropped = self.seen.retain(|name| watch_list.contains(name));
        if dropped > 0 {
            debug!("Dropped seen memory for {} removed source(s)", dropped);
        }

        let mut report = CycleReport::default();
        for source in watch_list.sources() {
            report.sources.push(self.poll_source(&source).await);
        }

        if report.is_quiet() {
            debug!("Cycle finished: {}", report);
        } else {
            info!("Cycle finished: {}", report);
        }

        report
    }

    async fn poll_source(&self, source: &Source) -> SourceReport {
        let mut report = SourceReport::new(&source.name);

        let entries = match self.source.fetch(&source.url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = %source.name, "Fetch failed: {}", e);
                report.fetch_error = Some(e.to_string());
                return report;
            }
        };

        // Feeds list newest first; deliver the considered batch oldest first
        let batch = &entries[..entries.len().min(self.entries_per_cycle)];

        for entry in batch.iter().rev() {
            if self.seen.has(&source.name, &entry.link) {
                continue;
            }

            let notification = Notification::from_entry(&source.name, entry);
            match self.notifier.send(&notification).await {
                Ok(()) => {
                    // Recorded only after a successful send, never before
                    self.seen.record(&source.name, &entry.link);
                    report.delivered += 1;
                    debug!(source = %source.name, "Delivered {}", entry.link);
                }
                Err(e) => {
                    warn!(source = %source.name, "Delivery of {} failed: {}", entry.link, e);
                    report.failed += 1;
                    report.delivery_error = Some((entry.link.clone(), e.to_string()));
                    // Stop here so later entries are not delivered ahead of this one
                    break;
                }
            }
        }

        report
    }
}
