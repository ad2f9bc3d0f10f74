//! Admin-tunable key/value settings

use rusqlite::{params, Connection, OptionalExtension, Result};
use strum::{AsRefStr, Display, EnumString};

/// Known setting keys. Values are always stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    /// Daily uploads allowed on the free tier
    FreeCredits,
    /// Payment-collection identifier shown in plan and quota messages
    UpiId,
    /// Admin contact handle
    AdminUsername,
    /// Custom plan announcement, may contain `{upi}` and `{username}`
    PlansText,
}

pub fn get_setting(conn: &Connection, key: SettingKey) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        params![key.as_ref()],
        |row| row.get::<_, Option<String>>(0),
    )
    .optional()
    .map(Option::flatten)
}

pub fn set_setting(conn: &Connection, key: SettingKey, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key.as_ref(), value],
    )?;
    Ok(())
}
