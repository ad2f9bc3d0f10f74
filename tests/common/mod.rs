//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use filelink_bot::core::clock::ManualClock;
use filelink_bot::core::config::BotConfig;
use filelink_bot::storage::{create_pool, LinkStore, SettingDefaults};
use tempfile::TempDir;

pub const ADMIN_ID: i64 = 1000;

/// A store on a throwaway database file with a controllable clock.
/// The temp dir lives as long as the environment.
pub struct TestEnvironment {
    pub store: LinkStore,
    pub clock: Arc<ManualClock>,
    pub config: BotConfig,
    pub db_path: PathBuf,
    _dir: TempDir,
}

/// 2024-03-10 12:00:00 UTC
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

pub fn test_config() -> BotConfig {
    BotConfig {
        admin_ids: vec![ADMIN_ID],
        ..BotConfig::default()
    }
}

impl TestEnvironment {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("files.db");
        let pool = create_pool(db_path.to_str().unwrap()).unwrap();

        let config = test_config();
        let clock = Arc::new(ManualClock::new(start_time()));
        let store = LinkStore::with_clock(Arc::new(pool), SettingDefaults::from(&config), clock.clone());

        Self {
            store,
            clock,
            config,
            db_path,
            _dir: dir,
        }
    }
}
