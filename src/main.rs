use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use filelink_bot::cli::{Cli, Commands};
use filelink_bot::core::{init_logger, log_startup_configuration, BotConfig};
use filelink_bot::storage::{create_pool, get_connection, LinkStore, SettingDefaults};
use filelink_bot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the bot
///
/// Parses CLI arguments and dispatches to the selected subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();
    let config = BotConfig::from_env();

    // Initialize logger (console + file)
    init_logger(&config)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot(config).await,
        Some(Commands::Migrate) => run_migrate(&config),
        Some(Commands::Grant { user_id, months }) => {
            let store = open_store(&config)?;
            let expires_at = store.grant_premium(user_id, months)?;
            log::info!("User {} is premium until {}", user_id, expires_at.format("%Y-%m-%d"));
            Ok(())
        }
        Some(Commands::Revoke { user_id }) => {
            let store = open_store(&config)?;
            store.revoke_premium(user_id)?;
            Ok(())
        }
    }
}

fn open_store(config: &BotConfig) -> Result<LinkStore> {
    let pool = create_pool(&config.database_path)?;
    Ok(LinkStore::new(Arc::new(pool), SettingDefaults::from(config)))
}

/// Applies migrations (pool creation does this) and checks a connection
fn run_migrate(config: &BotConfig) -> Result<()> {
    let pool = create_pool(&config.database_path)?;
    let _conn = get_connection(&pool)?;
    log::info!("Migrations applied to {}", config.database_path);
    Ok(())
}

async fn run_bot(config: BotConfig) -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration(&config);

    if config.bot_token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }

    let store = open_store(&config)?;

    let bot = create_bot(&config)?;
    let me = bot.get_me().await?;
    let bot_username = me.user.username.clone().unwrap_or_default();
    if bot_username.is_empty() {
        anyhow::bail!("Bot account has no username; share links cannot be built");
    }
    log::info!("Bot username: @{}", bot_username);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = HandlerDeps::new(store, Arc::new(config), bot_username);

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .error_handler(LoggingErrorHandler::with_custom_text("An error has occurred in the dispatcher"))
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
