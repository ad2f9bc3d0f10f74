use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};

use crate::core::config;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Columns added over time to tables that may predate the migration history.
/// `created_at` has no default here: SQLite refuses non-constant defaults on
/// `ADD COLUMN`, so repaired rows keep NULL and never count toward a quota day.
const LEGACY_COLUMNS: &[(&str, &str, &str)] = &[
    ("files", "file_type", "TEXT"),
    ("files", "user_id", "INTEGER"),
    ("files", "created_at", "TIMESTAMP DEFAULT NULL"),
    ("users", "expiry_date", "TIMESTAMP"),
];

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    // Serialize migrations per-process; refinery wraps each migration in its
    // own transaction.
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    conn.busy_timeout(config::database::busy_timeout())
        .context("set SQLite busy timeout")?;

    let report = embedded::migrations::runner().run(conn).context("apply migrations")?;
    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}

/// Adds columns missing from tables created by older deployments.
///
/// Tables that do not exist yet are left alone; the initial migration creates
/// them with every column.
pub fn repair_legacy_schema(conn: &Connection) -> rusqlite::Result<()> {
    for (table, column, definition) in LEGACY_COLUMNS {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() || columns.iter().any(|c| c == column) {
            continue;
        }

        log::info!("Adding missing column: {} to {} table", column, table);
        conn.execute(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition), [])?;
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    rows.collect()
}
