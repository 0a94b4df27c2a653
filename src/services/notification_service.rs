use async_trait::async_trait;
use telegram::{BotClient, ParseMode, TelegramError, MAX_MESSAGE_CHARS};
use tracing::info;

use crate::config::BotConfig;
use crate::domain::Notification;
use crate::errors::{FeedbotError, FeedbotResult};

/// Downstream recipient of new-entry notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Failures are `FeedbotError::Delivery`.
    async fn send(&self, notification: &Notification) -> FeedbotResult<()>;
}

/// Sends notifications to a single Telegram chat.
pub struct TelegramNotifier {
    client: BotClient,
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(config: &BotConfig) -> FeedbotResult<Self> {
        let client = BotClient::new(&config.token)?;
        Ok(Self::with_client(client, config.target_chat_id))
    }

    pub fn with_client(client: BotClient, chat_id: i64) -> Self {
        Self { client, chat_id }
    }

    async fn try_send(&self, text: &str) -> Result<(), TelegramError> {
        self.client
            .send_message(self.chat_id, text, Some(ParseMode::Html))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Send a notification, shortening the title if Telegram says it is too long
    async fn send(&self, notification: &Notification) -> FeedbotResult<()> {
        // Try with full message first
        match self.try_send(&notification.format()).await {
            Ok(()) => return Ok(()),
            Err(TelegramError::MessageTooLong) => {}
            Err(e) => return Err(FeedbotError::Delivery(e.to_string())),
        }

        // Longest title that fits the Bot API limit, found locally so only
        // the final candidate is sent
        let total = notification.title.chars().count();
        let mut keep = longest_fitting_title(notification, total.saturating_sub(1));

        // Servers with a tighter limit than advertised: keep halving
        loop {
            match self.try_send(&notification.format_truncated(keep)).await {
                Ok(()) => return Ok(()),
                Err(TelegramError::MessageTooLong) if keep > 0 => keep /= 2,
                Err(TelegramError::MessageTooLong) => break,
                Err(e) => return Err(FeedbotError::Delivery(e.to_string())),
            }
        }

        Err(FeedbotError::Delivery(format!(
            "message for {} does not fit even without a title",
            notification.link
        )))
    }
}

/// Largest title length, at most `max`, whose rendered message stays within
/// `MAX_MESSAGE_CHARS`. Returns 0 when nothing fits.
fn longest_fitting_title(notification: &Notification, max: usize) -> usize {
    let fits = |n: usize| notification.format_truncated(n).chars().count() <= MAX_MESSAGE_CHARS;

    let (mut low, mut high) = (0, max);
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if fits(mid) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> FeedbotResult<()> {
        info!(
            source = %notification.source_name,
            "[DRY RUN] {}",
            notification.format().replace('\n', " ")
        );
        Ok(())
    }
}
