//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod handlers;
pub mod markdown;
pub mod messages;

pub use teloxide::Bot;

// Re-exports for convenience
pub use admin::{handle_admin_command, AdminAction};
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
