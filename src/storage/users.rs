//! Premium entitlement rows
//!
//! A missing row means free tier. The predicate itself lives in the store;
//! these functions only read and write rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::db::{parse_db_timestamp, to_db_timestamp};

/// Raw `users` row. `expiry_raw` is kept as stored text so callers decide how
/// to treat values that fail to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementRow {
    pub user_id: i64,
    pub is_premium: bool,
    pub expiry_raw: Option<String>,
}

pub fn get_entitlement_row(conn: &Connection, user_id: i64) -> Result<Option<EntitlementRow>> {
    conn.query_row(
        "SELECT user_id, is_premium, expiry_date FROM users WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(EntitlementRow {
                user_id: row.get(0)?,
                is_premium: row.get::<_, Option<i64>>(1)?.unwrap_or(0) != 0,
                expiry_raw: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Creates or overwrites a premium grant. `None` expiry is a lifetime grant.
pub fn upsert_premium(conn: &Connection, user_id: i64, expires_at: Option<DateTime<Utc>>) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, is_premium, expiry_date) VALUES (?1, 1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET is_premium = 1, expiry_date = excluded.expiry_date",
        params![user_id, expires_at.map(to_db_timestamp)],
    )?;
    Ok(())
}

/// Clears the premium flag. Returns the number of rows touched; zero when the
/// user never had a row.
pub fn clear_premium(conn: &Connection, user_id: i64) -> Result<usize> {
    conn.execute("UPDATE users SET is_premium = 0 WHERE user_id = ?1", params![user_id])
}

/// Whether a stored expiry still grants premium at `now`.
///
/// Missing or blank means lifetime. A value that does not parse never grants
/// premium, whatever it would sort like as text.
pub fn expiry_is_active(expiry_raw: Option<&str>, now: DateTime<Utc>) -> bool {
    match expiry_raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(raw) => parse_db_timestamp(raw).is_some_and(|expires_at| expires_at > now),
    }
}

/// Counts rows flagged premium whose expiry is active at `now`, using
/// [`expiry_is_active`] so legacy and unreadable values are judged the same
/// way as the per-user premium check.
pub fn count_active_premium(conn: &Connection, now: DateTime<Utc>) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT expiry_date FROM users WHERE is_premium = 1")?;
    let expiries = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

    let mut active = 0;
    for expiry in expiries {
        if expiry_is_active(expiry?.as_deref(), now) {
            active += 1;
        }
    }
    Ok(active)
}
