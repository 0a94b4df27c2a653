pub mod seen_registry;
pub mod poller;
pub mod scheduler;
pub mod admin_service;
pub mod notification_service;

pub use seen_registry::{SeenRegistry, SeenSet, SEEN_CAPACITY};
pub use poller::{CycleReport, FeedPoller, SourceReport, ENTRIES_PER_CYCLE};
pub use scheduler::{spawn_scheduler, PollScheduler, SchedulerState};
pub use admin_service::AdminService;
pub use notification_service::{LogNotifier, Notifier, TelegramNotifier};
