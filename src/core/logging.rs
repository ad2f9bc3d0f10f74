//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the effective configuration

use anyhow::{Context, Result};
use simplelog::{ColorChoice, CombinedLogger, Config, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;

use crate::core::config::BotConfig;

/// Targets whose records are dropped; their connection chatter drowns the bot's own lines
const QUIET_TARGETS: [&str; 2] = ["hyper", "reqwest"];

fn logger_config() -> Config {
    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339().set_thread_level(log::LevelFilter::Off);
    for target in QUIET_TARGETS {
        builder.add_filter_ignore_str(target);
    }
    builder.build()
}

/// Starts console and file logging at `config.log_level`.
///
/// The log file is appended to, so restarts keep earlier history.
pub fn init_logger(config: &BotConfig) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file_path)
        .with_context(|| format!("Failed to open log file {}", config.log_file_path))?;

    CombinedLogger::init(vec![
        TermLogger::new(config.log_level, logger_config(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(config.log_level, logger_config(), log_file),
    ])
    .context("Failed to initialize logger")?;

    Ok(())
}

/// Logs the effective configuration at startup. The bot token is never printed.
pub fn log_startup_configuration(config: &BotConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("  • Database: {}", config.database_path);
    log::info!("  • Log file: {} ({})", config.log_file_path, config.log_level);
    match &config.bot_api_url {
        Some(url) => log::info!("  • Bot API: {}", url),
        None => log::info!("  • Bot API: api.telegram.org"),
    }
    log::info!("  • Default free credits: {}", config.default_free_credits);

    if config.admin_ids.is_empty() {
        log::warn!("⚠️  No admin configured (set ADMIN_IDS or ADMIN_USER_ID) - admin commands are disabled");
    } else {
        log::info!("  • Admins: {:?}", config.admin_ids);
    }

    if config.bot_token.is_empty() {
        log::error!("❌ BOT_TOKEN is not set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn config_for(path: &str) -> BotConfig {
        BotConfig {
            log_file_path: path.to_string(),
            ..BotConfig::default()
        }
    }

    #[test]
    fn test_init_logger_keeps_existing_log() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "previous run").unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        // The global logger can only be set once per process, so a second
        // initialisation from another test may legitimately fail.
        let result = init_logger(&config_for(&path));
        assert!(result.is_ok() || result.unwrap_err().to_string().contains("initialize logger"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("previous run\n"));
    }

    #[test]
    fn test_init_logger_rejects_missing_directory() {
        let err = init_logger(&config_for("/nonexistent-dir/definitely/missing.log")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/definitely/missing.log"));
    }
}
