//! Owner-only Telegram command surface for managing the watch list.

pub mod commands;
pub mod handler;
pub mod listener;

pub use commands::BotCommand;
pub use handler::CommandHandler;
pub use listener::BotListener;
