pub mod source;
pub mod entry;
pub mod notification;

pub use source::{Source, WatchList};
pub use entry::Entry;
pub use notification::Notification;
