use std::sync::Arc;
use std::time::Duration;

use telegram::{BotClient, ParseMode, TelegramError, Update};
use tracing::{debug, error, info, warn};

use crate::bot::handler::CommandHandler;
use crate::shutdown::ShutdownSignal;

const LONG_POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-polls Telegram for commands and answers them.
pub struct BotListener {
    client: BotClient,
    handler: Arc<CommandHandler>,
    poll_timeout_secs: u64,
    retry_delay: Duration,
}

impl BotListener {
    pub fn new(client: BotClient, handler: CommandHandler) -> Self {
        Self {
            client,
            handler: Arc::new(handler),
            poll_timeout_secs: LONG_POLL_TIMEOUT_SECS,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_timings(mut self, poll_timeout_secs: u64, retry_delay: Duration) -> Self {
        self.poll_timeout_secs = poll_timeout_secs;
        self.retry_delay = retry_delay;
        self
    }

    pub async fn run(&self, mut shutdown: ShutdownSignal) {
        info!("Telegram command listener started");
        let mut offset: Option<i64> = None;

        loop {
            let result = tokio::select! {
                result = self.client.get_updates(offset, self.poll_timeout_secs) => result,
                _ = shutdown.triggered() => break,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.process(update).await;
                    }
                }
                Err(e) => {
                    warn!("Fetching Telegram updates failed: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_delay) => {}
                        _ = shutdown.triggered() => break,
                    }
                }
            }
        }

        info!("Telegram command listener stopped");
    }

    async fn process(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let (Some(from), Some(text)) = (message.from.as_ref(), message.text.as_deref()) else {
            return;
        };

        // Admin operations touch the store synchronously
        let handler = Arc::clone(&self.handler);
        let user_id = from.id;
        let text = text.to_string();
        let reply = match tokio::task::spawn_blocking(move || handler.handle(user_id, &text)).await
        {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(e) => {
                error!("Command handling failed: {}", e);
                return;
            }
        };

        debug!("Replying to command in chat {}", message.chat.id);
        self.reply(message.chat.id, &reply).await;
    }

    /// Send a Markdown reply, falling back to plain text if Telegram
    /// cannot parse the markup.
    async fn reply(&self, chat_id: i64, text: &str) {
        let result = match self
            .client
            .send_message(chat_id, text, Some(ParseMode::Markdown))
            .await
        {
            Err(TelegramError::Api { code: 400, description })
                if description.contains("can't parse entities") =>
            {
                debug!("Markdown rejected in chat {}, resending as plain text", chat_id);
                self.client.send_message(chat_id, text, None).await
            }
            other => other,
        };

        if let Err(e) = result {
            warn!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }
}
