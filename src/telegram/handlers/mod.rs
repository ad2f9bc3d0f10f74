//! Telegram bot handler tree
//!
//! The same schema is used by the dispatcher in `main` and is the only
//! entry point for updates.

mod commands;
mod schema;
mod types;
mod uploads;

pub use schema::schema;
pub use types::{caller_id, HandlerDeps, HandlerError};
pub use uploads::{extract_upload, IncomingUpload};
