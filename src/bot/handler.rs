use std::sync::Arc;

use tracing::{debug, error};

use crate::bot::commands::BotCommand;
use crate::errors::FeedbotError;
use crate::services::AdminService;

/// Turns owner messages into admin operations and reply texts.
pub struct CommandHandler {
    admin: Arc<AdminService>,
    owner_id: i64,
}

impl CommandHandler {
    pub fn new(admin: Arc<AdminService>, owner_id: i64) -> Self {
        Self { admin, owner_id }
    }

    /// Reply for a message, or `None` when the bot should stay silent
    /// (not the owner, or not a command).
    pub fn handle(&self, user_id: i64, text: &str) -> Option<String> {
        if user_id != self.owner_id {
            debug!("Ignoring message from user {}", user_id);
            return None;
        }

        let command = BotCommand::parse(text)?;
        Some(self.execute(command))
    }

    fn execute(&self, command: BotCommand) -> String {
        match command {
            BotCommand::Start => "✅ Feed bot is running!".to_string(),
            BotCommand::Usage(usage) => usage.to_string(),
            BotCommand::AddSource { name, url } => match self.admin.add_source(&name, &url) {
                Ok(source) => format!("✅ Added source `{}`.", source.name),
                Err(FeedbotError::Validation(reason)) => format!("⚠️ {}", escape_markdown(&reason)),
                Err(e) => {
                    error!("addsource failed: {}", e);
                    format!("⚠️ Could not add source: {}", escape_markdown(&e.to_string()))
                }
            },
            BotCommand::RemoveSource { name } => match self.admin.remove_source(&name) {
                Ok(source) => format!("❌ Removed source `{}`.", source.name),
                Err(FeedbotError::NotFound(_)) => "Source not found.".to_string(),
                Err(e) => {
                    error!("removesource failed: {}", e);
                    format!(
                        "⚠️ Could not remove source: {}",
                        escape_markdown(&e.to_string())
                    )
                }
            },
            BotCommand::ListSources => match self.admin.list_sources() {
                Ok(list) if list.is_empty() => "No sources added.".to_string(),
                Ok(list) => list
                    .sources()
                    .map(|s| format!("- `{}`: {}", s.name, escape_markdown(&s.url)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                Err(e) => {
                    error!("listsources failed: {}", e);
                    format!(
                        "⚠️ Could not read sources: {}",
                        escape_markdown(&e.to_string())
                    )
                }
            },
        }
    }
}

/// Escape the characters legacy Telegram Markdown treats as entity markers.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
