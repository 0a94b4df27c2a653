use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedbotError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Admin input errors
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Source not found: {0}")]
    NotFound(String),

    // Poll cycle errors
    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    // Storage errors
    #[error("Watch list store error: {0}")]
    Store(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Errors from the telegram client library
    #[error("Telegram error: {0}")]
    Telegram(String),
}

impl From<telegram::TelegramError> for FeedbotError {
    fn from(err: telegram::TelegramError) -> Self {
        FeedbotError::Telegram(err.to_string())
    }
}

pub type FeedbotResult<T> = Result<T, FeedbotError>;
