//! Runtime configuration
//!
//! Everything is read once in `main` into a [`BotConfig`] that is passed down
//! explicitly. Values stored in the `settings` table override the payment and
//! quota defaults at runtime; the environment only supplies the fallbacks.

use log::LevelFilter;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Daily uploads allowed on the free tier when `free_credits` is unset or unparsable
pub const DEFAULT_FREE_CREDITS: i64 = 2;

/// Payment identifier shown when neither the setting nor `UPI_ID` is set
pub const DEFAULT_UPI_ID: &str = "yourname@upi";

/// Admin contact handle shown when neither the setting nor `ADMIN_USERNAME` is set
pub const DEFAULT_ADMIN_USERNAME: &str = "your_telegram_username";

/// Database file path used when `DATABASE_PATH` is unset
pub const DEFAULT_DATABASE_PATH: &str = "files.db";

/// Log file path used when `LOG_FILE_PATH` is unset
pub const DEFAULT_LOG_FILE_PATH: &str = "app.log";

/// Premium and file code constants
pub mod links {
    /// Length of a generated file code
    pub const CODE_LENGTH: usize = 8;

    /// Insert attempts before giving up on a colliding code
    pub const MAX_CODE_ATTEMPTS: u32 = 5;

    /// One premium "month" is a fixed 30 days, not a calendar month
    pub const DAYS_PER_PREMIUM_MONTH: i64 = 30;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// HTTP request timeout for the Bot API client (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Database configuration
pub mod database {
    use super::Duration;

    /// Maximum number of pooled SQLite connections
    pub const POOL_MAX_SIZE: u32 = 8;

    /// How long a writer waits for the SQLite lock (in seconds)
    pub const BUSY_TIMEOUT_SECS: u64 = 30;

    /// Busy timeout duration
    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}

/// Parses a comma/whitespace separated list of Telegram user ids.
/// Entries that are not integers are skipped.
pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split([',', ' ', '\n', '\t'])
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// `LOG_LEVEL` value to a filter. Unknown or missing values mean info.
pub fn parse_log_level(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|s| LevelFilter::from_str(s.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

/// Bot configuration assembled at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot token (`BOT_TOKEN`, falling back to `TELOXIDE_TOKEN`)
    pub bot_token: String,
    /// Custom Bot API server (`BOT_API_URL`)
    pub bot_api_url: Option<String>,
    /// SQLite database path (`DATABASE_PATH`)
    pub database_path: String,
    /// Log file path (`LOG_FILE_PATH`)
    pub log_file_path: String,
    /// Verbosity for console and file (`LOG_LEVEL`, default info)
    pub log_level: LevelFilter,
    /// Users allowed to run admin commands (`ADMIN_IDS`, else `ADMIN_USER_ID`)
    pub admin_ids: Vec<i64>,
    /// Fallback for the `upi_id` setting (`UPI_ID`)
    pub default_upi_id: String,
    /// Fallback for the `admin_username` setting (`ADMIN_USERNAME`)
    pub default_admin_username: String,
    /// Fallback for the `free_credits` setting (`FREE_CREDITS`)
    pub default_free_credits: i64,
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut admin_ids = non_empty("ADMIN_IDS")
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default();
        if admin_ids.is_empty() {
            if let Some(id) = non_empty("ADMIN_USER_ID").and_then(|s| s.parse::<i64>().ok()) {
                admin_ids.push(id);
            }
        }

        Self {
            bot_token: non_empty("BOT_TOKEN")
                .or_else(|| non_empty("TELOXIDE_TOKEN"))
                .unwrap_or_default(),
            bot_api_url: non_empty("BOT_API_URL"),
            database_path: non_empty("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_file_path: non_empty("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            log_level: parse_log_level(non_empty("LOG_LEVEL").as_deref()),
            admin_ids,
            default_upi_id: non_empty("UPI_ID").unwrap_or_else(|| DEFAULT_UPI_ID.to_string()),
            default_admin_username: non_empty("ADMIN_USERNAME")
                .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            default_free_credits: non_empty("FREE_CREDITS")
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|n| *n >= 0)
                .unwrap_or(DEFAULT_FREE_CREDITS),
        }
    }

    /// Check if user is admin
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> BotConfig {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        BotConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(parse_admin_ids("1, 2,3\n4\tfoo"), vec![1, 2, 3, 4]);
        assert!(parse_admin_ids("").is_empty());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level(None), LevelFilter::Info);
        assert_eq!(parse_log_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_log_level(Some(" warn ")), LevelFilter::Warn);
        assert_eq!(parse_log_level(Some("off")), LevelFilter::Off);
        assert_eq!(parse_log_level(Some("chatty")), LevelFilter::Info);
        assert_eq!(config_from(&[("LOG_LEVEL", "trace")]).log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert!(config.bot_token.is_empty());
        assert!(config.admin_ids.is_empty());
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.default_free_credits, DEFAULT_FREE_CREDITS);
        assert_eq!(config.default_upi_id, DEFAULT_UPI_ID);
        assert_eq!(config.default_admin_username, DEFAULT_ADMIN_USERNAME);
    }

    #[test]
    fn test_single_admin_fallback() {
        let config = config_from(&[("ADMIN_USER_ID", "42")]);
        assert!(config.is_admin(42));
        assert!(!config.is_admin(43));

        let config = config_from(&[("ADMIN_IDS", "7,8"), ("ADMIN_USER_ID", "42")]);
        assert!(config.is_admin(7));
        assert!(config.is_admin(8));
        assert!(!config.is_admin(42));
    }

    #[test]
    fn test_token_fallback_and_bad_credits() {
        let config = config_from(&[("TELOXIDE_TOKEN", "abc"), ("FREE_CREDITS", "lots")]);
        assert_eq!(config.bot_token, "abc");
        assert_eq!(config.default_free_credits, DEFAULT_FREE_CREDITS);

        let config = config_from(&[("BOT_TOKEN", "main"), ("TELOXIDE_TOKEN", "abc"), ("FREE_CREDITS", "5")]);
        assert_eq!(config.bot_token, "main");
        assert_eq!(config.default_free_credits, 5);
    }
}
