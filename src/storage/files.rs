//! Shared file links
//!
//! One row per successful upload, keyed by a short random code. Rows are
//! append-only: nothing in the bot updates or deletes them.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

use super::db::{parse_db_timestamp, to_db_timestamp};
use crate::core::config::links::CODE_LENGTH;

/// Kind of media behind a link; selects the send method on retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    Document,
    Photo,
    Video,
    Audio,
}

impl FileKind {
    /// Unknown or missing stored kinds are resent as documents.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|s| FileKind::from_str(s).ok()).unwrap_or(FileKind::Document)
    }
}

/// A registered upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    pub code: String,
    /// Telegram file_id, handed back verbatim on resend
    pub file_ref: String,
    pub file_kind: FileKind,
    pub owner_id: i64,
    /// None for legacy rows whose timestamp is missing or unreadable
    pub created_at: Option<DateTime<Utc>>,
}

/// Generates a retrieval code: 8 characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Inserts a new link. A plain INSERT: an existing code is a constraint
/// violation, never an overwrite.
pub fn insert_file(conn: &Connection, link: &FileLink, created_at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO files (code, file_id, file_type, user_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            link.code,
            link.file_ref,
            link.file_kind.as_ref(),
            link.owner_id,
            to_db_timestamp(created_at),
        ],
    )?;
    Ok(())
}

/// Looks a link up by code
pub fn get_file(conn: &Connection, code: &str) -> Result<Option<FileLink>> {
    conn.query_row(
        "SELECT code, file_id, file_type, user_id, created_at FROM files WHERE code = ?1",
        params![code],
        |row| {
            let file_type: Option<String> = row.get(2)?;
            let created_at: Option<String> = row.get(4)?;
            Ok(FileLink {
                code: row.get(0)?,
                file_ref: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                file_kind: FileKind::from_stored(file_type.as_deref()),
                owner_id: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
                created_at: created_at.as_deref().and_then(parse_db_timestamp),
            })
        },
    )
    .optional()
}

/// Counts a user's links created in `[start, end)`
pub fn count_user_files_between(
    conn: &Connection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM files WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3",
        params![user_id, to_db_timestamp(start), to_db_timestamp(end)],
        |row| row.get(0),
    )
}

/// Counts all links created in `[start, end)`
pub fn count_files_between(conn: &Connection, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM files WHERE created_at >= ?1 AND created_at < ?2",
        params![to_db_timestamp(start), to_db_timestamp(end)],
        |row| row.get(0),
    )
}

/// Counts every registered link
pub fn count_files(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
}
