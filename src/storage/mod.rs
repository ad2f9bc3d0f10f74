//! Database schema, row access, and the entitlement & link store

pub mod db;
pub mod files;
pub mod migrations;
pub mod settings;
pub mod store;
pub mod users;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use files::{FileKind, FileLink};
pub use settings::SettingKey;
pub use store::{Entitlement, LinkStore, SettingDefaults, StoreStats, UploadOutcome};
