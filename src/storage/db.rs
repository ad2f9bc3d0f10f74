use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use super::migrations::{repair_legacy_schema, run_migrations};
use crate::core::config;
use crate::core::error::{AppError, AppResult};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Storage format for timestamps. Same shape as SQLite's `CURRENT_TIMESTAMP`,
/// so rows written by either side sort and compare as plain text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Create a new database connection pool
///
/// Every connection gets a busy timeout and WAL journaling so concurrent
/// handlers queue on the SQLite write lock instead of failing. The schema is
/// brought up to date before the pool is returned.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use filelink_bot::storage::db;
///
/// let pool = db::create_pool("files.db")?;
/// # Ok::<(), filelink_bot::core::error::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(config::database::busy_timeout())?;
        let _mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        Ok(())
    });
    let pool = Pool::builder().max_size(config::database::POOL_MAX_SIZE).build(manager)?;

    let mut conn = pool.get()?;
    prepare_schema(&mut conn)?;
    log::info!("Database ready at {}", database_path);

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Repairs databases created before the migration history existed, then
/// applies pending migrations.
pub fn prepare_schema(conn: &mut Connection) -> AppResult<()> {
    repair_legacy_schema(conn)?;
    run_migrations(conn).map_err(|e| AppError::Migration(format!("{:#}", e)))
}

/// Formats a timestamp for storage
pub fn to_db_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Accepts the storage format, RFC 3339, and naive ISO-8601 with optional
/// fractional seconds (older rows). Naive values are taken as UTC.
pub fn parse_db_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
