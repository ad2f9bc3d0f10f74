//! Admin commands
//!
//! Parsing and execution are plain functions over the store so they can be
//! exercised without a Bot API. Callers that are not admins get `Ok(None)`:
//! no reply and no state change, so the admin surface stays invisible.

use super::bot::Command;
use super::messages;
use crate::core::config::BotConfig;
use crate::core::error::{AppError, AppResult};
use crate::storage::{LinkStore, SettingKey};

pub const SETTINGS_USAGE: &str = "⚙️ Admin Settings\n\
    Usage:\n\
    /settings credits [number] - Set daily free credits\n\
    /settings upi [id] - Change UPI ID\n\
    /settings username [name] - Change Admin Username";

pub const EDITPLAN_USAGE: &str = "Usage: /editplan [new plans text]\n\n\
    Tip: Use {upi} and {username} in your text to auto-fill your settings.";

pub const SETPREMIUM_USAGE: &str = "Usage: /setpremium [user_id] [months]";

pub const ENDPREMIUM_USAGE: &str = "Usage: /endpremium [user_id]";

/// A validated admin request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    SetFreeCredits(i64),
    SetUpiId(String),
    SetAdminUsername(String),
    SetPlansText(String),
    GrantPremium { user_id: i64, months: i64 },
    RevokePremium { user_id: i64 },
    Stats,
}

/// `/settings <credits|upi|username> <value>`
pub fn parse_settings_args(args: &str) -> AppResult<AdminAction> {
    let mut parts = args.split_whitespace();
    let Some(sub) = parts.next() else {
        return Err(AppError::Validation(SETTINGS_USAGE.to_string()));
    };
    let value = parts.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return Err(AppError::Validation(SETTINGS_USAGE.to_string()));
    }

    match sub.to_lowercase().as_str() {
        "credits" => value
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .map(AdminAction::SetFreeCredits)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "❌ Credits must be a non-negative whole number.\n\n{}",
                    SETTINGS_USAGE
                ))
            }),
        "upi" => Ok(AdminAction::SetUpiId(value)),
        "username" => Ok(AdminAction::SetAdminUsername(
            value.trim_start_matches('@').to_string(),
        )),
        _ => Err(AppError::Validation(SETTINGS_USAGE.to_string())),
    }
}

/// `/editplan <text>`; the text is kept verbatim, line breaks included
pub fn parse_editplan_args(args: &str) -> AppResult<AdminAction> {
    let text = args.trim();
    if text.is_empty() {
        return Err(AppError::Validation(EDITPLAN_USAGE.to_string()));
    }
    Ok(AdminAction::SetPlansText(text.to_string()))
}

/// `/setpremium <user_id> <months>`
pub fn parse_setpremium_args(args: &str) -> AppResult<AdminAction> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(AppError::Validation(SETPREMIUM_USAGE.to_string()));
    }

    let invalid = || AppError::Validation(format!("❌ Invalid Input.\n{}", SETPREMIUM_USAGE));
    let user_id = parts[0].parse::<i64>().map_err(|_| invalid())?;
    let months = parts[1].parse::<i64>().map_err(|_| invalid())?;
    if months < 1 {
        return Err(invalid());
    }

    Ok(AdminAction::GrantPremium { user_id, months })
}

/// `/endpremium <user_id>`
pub fn parse_endpremium_args(args: &str) -> AppResult<AdminAction> {
    let Some(raw) = args.split_whitespace().next() else {
        return Err(AppError::Validation(ENDPREMIUM_USAGE.to_string()));
    };
    raw.parse::<i64>()
        .map(|user_id| AdminAction::RevokePremium { user_id })
        .map_err(|_| AppError::Validation("❌ Invalid User ID.".to_string()))
}

/// Maps an admin command to its action. None for user commands.
pub fn parse_admin_command(cmd: &Command) -> Option<AppResult<AdminAction>> {
    match cmd {
        Command::Settings(args) => Some(parse_settings_args(args)),
        Command::EditPlan(args) => Some(parse_editplan_args(args)),
        Command::SetPremium(args) => Some(parse_setpremium_args(args)),
        Command::EndPremium(args) => Some(parse_endpremium_args(args)),
        Command::Stats => Some(Ok(AdminAction::Stats)),
        _ => None,
    }
}

/// Applies an action and returns the confirmation reply
pub fn execute_admin_action(store: &LinkStore, action: AdminAction) -> AppResult<String> {
    match action {
        AdminAction::SetFreeCredits(credits) => {
            store.set_setting(SettingKey::FreeCredits, &credits.to_string())?;
            Ok(format!("✅ Daily free credits set to: {}", credits))
        }
        AdminAction::SetUpiId(upi) => {
            store.set_setting(SettingKey::UpiId, &upi)?;
            Ok(format!("✅ UPI ID updated to: {}", upi))
        }
        AdminAction::SetAdminUsername(username) => {
            store.set_setting(SettingKey::AdminUsername, &username)?;
            Ok(format!("✅ Admin username updated to: @{}", username))
        }
        AdminAction::SetPlansText(text) => {
            store.set_setting(SettingKey::PlansText, &text)?;
            Ok("✅ Plans details updated!".to_string())
        }
        AdminAction::GrantPremium { user_id, months } => {
            let expires_at = store.grant_premium(user_id, months)?;
            Ok(messages::premium_granted_text(user_id, months, expires_at))
        }
        AdminAction::RevokePremium { user_id } => {
            store.revoke_premium(user_id)?;
            Ok(format!("✅ User {} Premium access has been canceled.", user_id))
        }
        AdminAction::Stats => Ok(messages::stats_text(&store.stats()?)),
    }
}

/// `Err(Unauthorized)` unless the caller is a configured admin
pub fn authorize(config: &BotConfig, caller_id: i64) -> AppResult<()> {
    if config.is_admin(caller_id) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Authorizes, parses and runs an admin command.
///
/// * `Ok(None)` - not an admin command, or the caller is not an admin
/// * `Ok(Some(reply))` - confirmation or usage hint to send back
/// * `Err(_)` - storage failure
pub fn handle_admin_command(
    store: &LinkStore,
    config: &BotConfig,
    caller_id: i64,
    cmd: &Command,
) -> AppResult<Option<String>> {
    if !cmd.is_admin_only() {
        return Ok(None);
    }
    if let Err(e) = authorize(config, caller_id) {
        log::debug!("Ignoring admin command {:?} from {}: {}", cmd, caller_id, e);
        return Ok(None);
    }

    let action = match parse_admin_command(cmd) {
        Some(Ok(action)) => action,
        Some(Err(AppError::Validation(usage))) => return Ok(Some(usage)),
        Some(Err(e)) => return Err(e),
        None => return Ok(None),
    };

    log::info!("Admin {} runs {:?}", caller_id, action);
    match execute_admin_action(store, action) {
        Ok(reply) => Ok(Some(reply)),
        Err(AppError::Validation(message)) => Ok(Some(format!("❌ {}", message))),
        Err(e) => Err(e),
    }
}
