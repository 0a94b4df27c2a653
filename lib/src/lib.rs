//! Telegram Bot API bindings for Rust
//! Provides the two calls a notification bot needs: sending a message and
//! long-polling for incoming updates.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram rejects text longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("Invalid bot token")]
    InvalidToken,
    #[error("Message is too long")]
    MessageTooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "Markdown")]
    Markdown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Every Bot API response is wrapped in this envelope, whatever the HTTP status.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TelegramError> {
        if self.ok {
            if let Some(result) = self.result {
                return Ok(result);
            }
        }

        let code = self.error_code.unwrap_or_default();
        let description = self
            .description
            .unwrap_or_else(|| "missing result".to_string());

        if code == 401 {
            return Err(TelegramError::InvalidToken);
        }
        if code == 400 && description.to_lowercase().contains("message is too long") {
            return Err(TelegramError::MessageTooLong);
        }

        Err(TelegramError::Api { code, description })
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct GetUpdatesPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: Vec<&'static str>,
}

#[derive(Clone)]
pub struct BotClient {
    url: String,
    client: Client,
}

impl BotClient {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    /// Point the client at a different Bot API server (self-hosted or a test double)
    pub fn with_api_url(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let token = token.trim();
        if token.is_empty() || token.contains('/') {
            return Err(TelegramError::InvalidToken);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            client,
        })
    }

    async fn call<P, T>(&self, method: &str, payload: &P, timeout: Duration) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.url, method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await?;

        // Error details live in the body, so the status is not checked here
        let envelope: ApiResponse<T> = response.json().await?;
        envelope.into_result()
    }

    /// Send a text message to a chat
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message, TelegramError> {
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(TelegramError::MessageTooLong);
        }

        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: false,
        };

        self.call(
            "sendMessage",
            &payload,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
        .await
    }

    /// Long-poll for new message updates.
    /// `offset` should be one past the last processed `update_id`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let payload = GetUpdatesPayload {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message"],
        };

        // The HTTP timeout has to outlast the server-side long poll
        self.call(
            "getUpdates",
            &payload,
            Duration::from_secs(timeout_secs + REQUEST_TIMEOUT_SECS),
        )
        .await
    }
}
