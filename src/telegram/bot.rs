//! Bot initialization and the command set
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Registration of the public command list in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, BotConfig};

/// Bot commands enum with descriptions. Admin commands are hidden from the
/// generated help and from the Telegram command menu.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start the bot, or open a shared file")]
    Start(String),
    #[command(description = "show how to use this bot")]
    Help,
    #[command(description = "check your plan and remaining credits")]
    Status,
    #[command(description = "view premium subscription plans")]
    Plan,
    #[command(description = "get your Telegram user ID")]
    MyId,
    #[command(hide)]
    Settings(String),
    #[command(hide)]
    EditPlan(String),
    #[command(hide)]
    SetPremium(String),
    #[command(hide)]
    EndPremium(String),
    #[command(hide)]
    Stats,
}

impl Command {
    /// True for commands only admins may run
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Command::Settings(_)
                | Command::EditPlan(_)
                | Command::SetPremium(_)
                | Command::EndPremium(_)
                | Command::Stats
        )
    }
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, HTTP client setup)
pub fn create_bot(bot_config: &BotConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(bot_config.bot_token.clone(), client);

    // Check if local Bot API server is configured
    let bot = match &bot_config.bot_api_url {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up the public bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "Start the bot & check status"),
        BotCommand::new("help", "Show how to use this bot"),
        BotCommand::new("status", "Check your plan and remaining credits"),
        BotCommand::new("plan", "View premium subscription plans"),
        BotCommand::new("myid", "Get your Telegram user ID"),
    ])
    .await?;

    Ok(())
}
