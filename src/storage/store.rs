//! Entitlement & link store
//!
//! The single stateful component of the bot. Handlers receive a clone of
//! [`LinkStore`] at startup; every read of premium status and daily usage goes
//! through [`LinkStore::check_entitlement`] so the upload gate and the status
//! messages always agree.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use std::sync::Arc;

use super::db::{get_connection, parse_db_timestamp, DbPool};
use super::files::{self, generate_code, FileKind, FileLink};
use super::settings::{self, SettingKey};
use super::users;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::links::{DAYS_PER_PREMIUM_MONTH, MAX_CODE_ATTEMPTS};
use crate::core::config::BotConfig;
use crate::core::error::{AppError, AppResult};

/// Fallbacks for settings that have never been set by an admin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDefaults {
    pub free_credits: i64,
    pub upi_id: String,
    pub admin_username: String,
}

impl From<&BotConfig> for SettingDefaults {
    fn from(config: &BotConfig) -> Self {
        Self {
            free_credits: config.default_free_credits,
            upi_id: config.default_upi_id.clone(),
            admin_username: config.default_admin_username.clone(),
        }
    }
}

/// Snapshot of a user's entitlement at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    pub premium: bool,
    /// Expiry of an active premium grant; None for lifetime or free users
    pub expires_at: Option<DateTime<Utc>>,
    /// Files uploaded during the current UTC day
    pub used: i64,
    /// Free-tier daily limit
    pub limit: i64,
}

impl Entitlement {
    /// Free credits left today (never negative)
    pub fn remaining(&self) -> i64 {
        (self.limit - self.used).max(0)
    }

    pub fn can_upload(&self) -> bool {
        self.premium || self.used < self.limit
    }

    /// `Err(QuotaExceeded)` when a free user has no credits left today
    pub fn ensure_quota(&self) -> AppResult<()> {
        if self.can_upload() {
            Ok(())
        } else {
            Err(AppError::QuotaExceeded {
                used: self.used,
                limit: self.limit,
            })
        }
    }
}

/// Result of the gated upload path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Stored; carries the new code and the entitlement after the upload
    Registered { code: String, entitlement: Entitlement },
    /// Free user already at today's limit; nothing was stored
    QuotaExceeded(Entitlement),
}

/// Admin statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total_files: i64,
    pub files_today: i64,
    pub active_premium: i64,
}

#[derive(Clone)]
pub struct LinkStore {
    pool: Arc<DbPool>,
    clock: Arc<dyn Clock>,
    defaults: SettingDefaults,
}

impl LinkStore {
    pub fn new(pool: Arc<DbPool>, defaults: SettingDefaults) -> Self {
        Self::with_clock(pool, defaults, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: Arc<DbPool>, defaults: SettingDefaults, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock, defaults }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Stores an uploaded file and returns its retrieval code.
    ///
    /// A fresh code is drawn for each attempt; on a primary-key conflict the
    /// insert is retried up to [`MAX_CODE_ATTEMPTS`] times before failing with
    /// [`AppError::CodeCollision`]. Existing rows are never overwritten.
    pub fn register_upload(&self, owner_id: i64, file_ref: &str, file_kind: FileKind) -> AppResult<String> {
        self.register_upload_with(owner_id, file_ref, file_kind, generate_code)
    }

    /// [`LinkStore::register_upload`] with the code source supplied by the caller
    pub(crate) fn register_upload_with<F>(
        &self,
        owner_id: i64,
        file_ref: &str,
        file_kind: FileKind,
        mut next_code: F,
    ) -> AppResult<String>
    where
        F: FnMut() -> String,
    {
        let conn = get_connection(&self.pool)?;
        let created_at = self.now();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let link = FileLink {
                code: next_code(),
                file_ref: file_ref.to_string(),
                file_kind,
                owner_id,
                created_at: Some(created_at),
            };

            match files::insert_file(&conn, &link, created_at) {
                Ok(()) => {
                    log::info!("Registered {} upload {} for user {}", file_kind, link.code, owner_id);
                    return Ok(link.code);
                }
                Err(e) if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) => {
                    log::warn!(
                        "File code collision on attempt {}/{} for user {}",
                        attempt,
                        MAX_CODE_ATTEMPTS,
                        owner_id
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::CodeCollision(MAX_CODE_ATTEMPTS))
    }

    /// Resolves a code to its file. The code is opaque input: any string is
    /// looked up as-is.
    pub fn resolve_code(&self, code: &str) -> AppResult<Option<FileLink>> {
        let conn = get_connection(&self.pool)?;
        Ok(files::get_file(&conn, code)?)
    }

    /// Like [`LinkStore::resolve_code`] but an unknown code is `Err(NotFound)`
    pub fn require_file(&self, code: &str) -> AppResult<FileLink> {
        self.resolve_code(code)?
            .ok_or_else(|| AppError::NotFound(code.to_string()))
    }

    /// Premium status, today's usage and the free limit for a user.
    ///
    /// An expired grant is demoted in the database before `premium: false`
    /// is returned.
    pub fn check_entitlement(&self, user_id: i64) -> AppResult<Entitlement> {
        let conn = get_connection(&self.pool)?;
        let now = self.now();

        let (premium, expires_at) = self.premium_status(&conn, user_id, now)?;
        let (day_start, day_end) = utc_day_bounds(now);
        let used = files::count_user_files_between(&conn, user_id, day_start, day_end)?;
        let limit = self.limit_from(&conn)?;

        Ok(Entitlement {
            premium,
            expires_at,
            used,
            limit,
        })
    }

    /// Premium status alone, without counting today's uploads. Goes through
    /// the same predicate as [`LinkStore::check_entitlement`], lazy demotion
    /// included.
    pub fn is_premium(&self, user_id: i64) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        Ok(self.premium_status(&conn, user_id, self.now())?.0)
    }

    /// Registers the upload unless a free user has used up today's quota.
    pub fn try_register_upload(&self, owner_id: i64, file_ref: &str, file_kind: FileKind) -> AppResult<UploadOutcome> {
        let before = self.check_entitlement(owner_id)?;
        if let Err(e) = before.ensure_quota() {
            log::info!("Upload rejected for user {}: {}", owner_id, e);
            return Ok(UploadOutcome::QuotaExceeded(before));
        }

        let code = self.register_upload(owner_id, file_ref, file_kind)?;
        let entitlement = self.check_entitlement(owner_id)?;
        Ok(UploadOutcome::Registered { code, entitlement })
    }

    /// Grants premium for `months` × 30 days from now and returns the expiry.
    pub fn grant_premium(&self, user_id: i64, months: i64) -> AppResult<DateTime<Utc>> {
        if months < 1 {
            return Err(AppError::Validation(format!(
                "months must be a positive integer, got {}",
                months
            )));
        }

        let expires_at = months
            .checked_mul(DAYS_PER_PREMIUM_MONTH)
            .and_then(TimeDelta::try_days)
            .and_then(|delta| self.now().checked_add_signed(delta))
            .ok_or_else(|| AppError::Validation(format!("{} months is out of range", months)))?;

        let conn = get_connection(&self.pool)?;
        users::upsert_premium(&conn, user_id, Some(expires_at))?;
        log::info!("Granted premium to user {} until {}", user_id, expires_at);
        Ok(expires_at)
    }

    /// Clears premium for a user. Idempotent; unknown users are not an error.
    pub fn revoke_premium(&self, user_id: i64) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        let touched = users::clear_premium(&conn, user_id)?;
        log::info!("Revoked premium for user {} ({} row(s) updated)", user_id, touched);
        Ok(())
    }

    pub fn get_setting(&self, key: SettingKey) -> AppResult<Option<String>> {
        let conn = get_connection(&self.pool)?;
        Ok(settings::get_setting(&conn, key)?)
    }

    pub fn set_setting(&self, key: SettingKey, value: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        settings::set_setting(&conn, key, value)?;
        log::info!("Setting {} updated", key);
        Ok(())
    }

    /// Current daily free limit
    pub fn free_credits(&self) -> AppResult<i64> {
        let conn = get_connection(&self.pool)?;
        self.limit_from(&conn)
    }

    /// Payment identifier, setting first then configured default
    pub fn upi_id(&self) -> AppResult<String> {
        Ok(self
            .get_setting(SettingKey::UpiId)?
            .unwrap_or_else(|| self.defaults.upi_id.clone()))
    }

    /// Admin contact handle without a leading `@`
    pub fn admin_username(&self) -> AppResult<String> {
        let raw = self
            .get_setting(SettingKey::AdminUsername)?
            .unwrap_or_else(|| self.defaults.admin_username.clone());
        Ok(raw.trim().trim_start_matches('@').to_string())
    }

    /// Custom plan text, if an admin has set one
    pub fn plans_text(&self) -> AppResult<Option<String>> {
        self.get_setting(SettingKey::PlansText)
    }

    pub fn stats(&self) -> AppResult<StoreStats> {
        let conn = get_connection(&self.pool)?;
        let now = self.now();
        let (day_start, day_end) = utc_day_bounds(now);

        Ok(StoreStats {
            total_files: files::count_files(&conn)?,
            files_today: files::count_files_between(&conn, day_start, day_end)?,
            active_premium: users::count_active_premium(&conn, now)?,
        })
    }

    /// The premium predicate with lazy demotion. Every premium check in the
    /// bot ends up here.
    fn premium_status(
        &self,
        conn: &rusqlite::Connection,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<(bool, Option<DateTime<Utc>>)> {
        let row = match users::get_entitlement_row(conn, user_id)? {
            Some(row) if row.is_premium => row,
            _ => return Ok((false, None)),
        };

        let raw = row.expiry_raw.as_deref();
        let expires_at = raw.map(str::trim).and_then(parse_db_timestamp);
        if users::expiry_is_active(raw, now) {
            return Ok((true, expires_at));
        }

        match expires_at {
            Some(expires_at) => {
                users::clear_premium(conn, user_id)?;
                log::info!("Premium for user {} expired at {}, demoted", user_id, expires_at);
            }
            None => log::warn!("Unreadable premium expiry {:?} for user {}", raw, user_id),
        }
        Ok((false, None))
    }

    fn limit_from(&self, conn: &rusqlite::Connection) -> AppResult<i64> {
        let raw = settings::get_setting(conn, SettingKey::FreeCredits)?;
        Ok(parse_credit_limit(raw.as_deref(), self.defaults.free_credits))
    }
}

/// Parses the `free_credits` setting; missing, non-integer or negative values
/// fall back to `default`.
pub fn parse_credit_limit(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 0)
        .unwrap_or(default)
}

/// `[00:00, next 00:00)` of the UTC day containing `now`
pub fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}
