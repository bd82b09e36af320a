//! Startup configuration.
//!
//! Everything the process needs is read once from the environment into an
//! explicit struct and handed to constructors; nothing reads env vars after
//! startup and there are no ambient globals.

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;

/// Default IANA zone the assistant speaks in.
const DEFAULT_TIMEZONE: &str = "America/Caracas";

/// Runtime configuration, loaded once at startup via [`Config::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string.
    pub mongodb_url: String,
    /// Database holding the assistant collections.
    pub database_name: String,
    /// Civil timezone all phrases are interpreted in.
    pub timezone: Tz,
    /// Telegram bot token used by the notifier.
    pub telegram_bot_token: String,
    /// Fixed destination chat for all notifications.
    pub telegram_chat_id: String,
    /// Default log filter when RUST_LOG is not set.
    pub log_level: String,
    /// Scheduler poll period in seconds.
    pub poll_seconds: u64,
    /// Delay before the next cycle after an unexpected scheduler error.
    pub backoff_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let timezone_name = optional("TIMEZONE", DEFAULT_TIMEZONE);
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| anyhow!("TIMEZONE '{timezone_name}' is not a known IANA zone"))?;

        Ok(Config {
            mongodb_url: required("MONGODB_URL")?,
            database_name: optional("DATABASE_NAME", "virtual_assistant"),
            timezone,
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            log_level: optional("LOG_LEVEL", "info"),
            poll_seconds: numeric("REMINDER_POLL_SECONDS", 30)?,
            backoff_seconds: numeric("REMINDER_BACKOFF_SECONDS", 60)?,
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow!("missing required environment variable {name}"))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn numeric(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: env vars are process-global and the test harness runs in
    // parallel, so all from_env checks share one function.
    #[test]
    fn test_from_env() {
        std::env::set_var("MONGODB_URL", "mongodb://localhost:27017");
        std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        std::env::set_var("TELEGRAM_CHAT_ID", "42");
        std::env::remove_var("TIMEZONE");
        std::env::remove_var("DATABASE_NAME");
        std::env::remove_var("REMINDER_POLL_SECONDS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.database_name, "virtual_assistant");
        assert_eq!(config.timezone, chrono_tz::America::Caracas);
        assert_eq!(config.poll_seconds, 30);
        assert_eq!(config.backoff_seconds, 60);

        std::env::set_var("TIMEZONE", "America/Nowhere");
        assert!(Config::from_env().is_err());
        std::env::remove_var("TIMEZONE");
    }
}
