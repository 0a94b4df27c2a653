use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{FeedbotError, FeedbotResult};

pub const DEFAULT_SOURCES_FILE: &str = "sources.json";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Credentials and addressing for the Telegram side of the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub owner_id: i64,
    pub target_chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sources_path: PathBuf,
    pub check_interval: Duration,
    pub port: u16,
    pub log_level: String,
    bot_token: Option<String>,
    owner_id: Option<i64>,
    target_chat_id: Option<i64>,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> FeedbotResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> FeedbotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sources_path = var("SOURCES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCES_FILE));

        let check_interval_secs = match var("CHECK_INTERVAL_SECS") {
            Some(raw) => parse_number::<u64>("CHECK_INTERVAL_SECS", &raw)?,
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };
        if check_interval_secs == 0 {
            return Err(FeedbotError::Config(
                "CHECK_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let port = match var("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let owner_id = var("OWNER_ID")
            .map(|raw| parse_number::<i64>("OWNER_ID", &raw))
            .transpose()?;

        let target_chat_id = var("TARGET_CHAT_ID")
            .map(|raw| parse_number::<i64>("TARGET_CHAT_ID", &raw))
            .transpose()?;

        Ok(Self {
            sources_path,
            check_interval: Duration::from_secs(check_interval_secs),
            port,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            bot_token: var("BOT_TOKEN"),
            owner_id,
            target_chat_id,
        })
    }

    /// Telegram settings, required only when the bot actually talks to Telegram.
    /// Notifications go to the owner unless TARGET_CHAT_ID says otherwise.
    pub fn bot(&self) -> FeedbotResult<BotConfig> {
        let token = self
            .bot_token
            .clone()
            .ok_or_else(|| FeedbotError::MissingEnvVar("BOT_TOKEN".to_string()))?;

        let owner_id = self
            .owner_id
            .ok_or_else(|| FeedbotError::MissingEnvVar("OWNER_ID".to_string()))?;

        Ok(BotConfig {
            token,
            owner_id,
            target_chat_id: self.target_chat_id.unwrap_or(owner_id),
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> FeedbotResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| FeedbotError::Config(format!("{} is not a valid number: {}", key, raw)))
}
