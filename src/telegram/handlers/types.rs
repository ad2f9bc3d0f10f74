//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::core::config::BotConfig;
use crate::storage::LinkStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: LinkStore,
    pub config: Arc<BotConfig>,
    /// Username of the running bot, used to build share links
    pub bot_username: String,
}

impl HandlerDeps {
    pub fn new(store: LinkStore, config: Arc<BotConfig>, bot_username: impl Into<String>) -> Self {
        Self {
            store,
            config,
            bot_username: bot_username.into(),
        }
    }
}

/// Telegram user id of the sender, if the message has one
pub fn caller_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok())
}
