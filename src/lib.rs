//! filelink-bot - Telegram bot that turns uploaded files into shareable links
//!
//! Users send a file and get back a deep link `https://t.me/<bot>?start=<code>`;
//! anyone opening the link receives the file. Free users get a daily quota,
//! admin-granted premium users are unlimited.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and the clock
//! - `storage`: SQLite schema and the entitlement & link store
//! - `telegram`: command set, handler tree and reply rendering

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, BotConfig};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, LinkStore};
pub use telegram::{create_bot, schema, HandlerDeps};
