//! Background task that drives poll cycles on a fixed interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::DEFAULT_CHECK_INTERVAL_SECS;
use crate::services::poller::{CycleReport, FeedPoller};
use crate::shutdown::ShutdownSignal;
use crate::storage::WatchListStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Between cycles
    Idle,
    /// A cycle is in progress
    Running,
}

/// Runs a cycle, waits out the interval, repeats until shutdown.
///
/// A cycle is never cut short: shutdown is honoured before a cycle starts
/// and while waiting between cycles.
pub struct PollScheduler {
    poller: Arc<FeedPoller>,
    store: Arc<dyn WatchListStore>,
    interval: Duration,
    running: AtomicBool,
    cycles: AtomicU64,
}

impl PollScheduler {
    pub fn new(poller: Arc<FeedPoller>, store: Arc<dyn WatchListStore>) -> Self {
        Self::with_interval(poller, store, Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS))
    }

    pub fn with_interval(
        poller: Arc<FeedPoller>,
        store: Arc<dyn WatchListStore>,
        interval: Duration,
    ) -> Self {
        Self {
            poller,
            store,
            interval,
            running: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Number of cycles attempted so far, failed ones included.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Run the scheduling loop until `shutdown` fires.
    pub async fn run(&self, mut shutdown: ShutdownSignal) {
        info!(
            "Poll scheduler started (interval: {} seconds)",
            self.interval.as_secs_f64()
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }

            self.running.store(true, Ordering::SeqCst);
            self.run_cycle().await;
            self.running.store(false, Ordering::SeqCst);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.triggered() => break,
            }
        }

        info!("Poll scheduler stopped after {} cycle(s)", self.cycles());
    }

    /// Run one cycle in its own task so that an error or a panic inside it
    /// is logged here and never ends the loop.
    async fn run_cycle(&self) -> Option<CycleReport> {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Starting poll cycle {}", cycle);

        let poller = Arc::clone(&self.poller);
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move { poller.poll(store).await });

        match handle.await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                error!("Poll cycle {} failed: {}", cycle, e);
                None
            }
            Err(e) if e.is_panic() => {
                error!("Poll cycle {} panicked", cycle);
                None
            }
            Err(e) => {
                error!("Poll cycle {} was cancelled: {}", cycle, e);
                None
            }
        }
    }
}

/// Start the scheduler as a background task.
pub fn spawn_scheduler(scheduler: Arc<PollScheduler>, shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        scheduler.run(shutdown).await;
    })
}
